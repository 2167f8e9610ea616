//! Payment ledger
//!
//! Orders are paid in two stages: an advance declared at checkout and a single
//! balance payment before shipment. `paid + remaining` always equals the order total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment ledger errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("payment amount cannot be negative")]
    NegativeAmount,

    #[error("advance of {advance} exceeds order total of {total}")]
    AdvanceExceedsTotal { advance: Decimal, total: Decimal },

    #[error("order is already fully paid")]
    AlreadyPaid,

    #[error("balance due is {expected}, but {received} was captured")]
    AmountMismatch { expected: Decimal, received: Decimal },
}

/// Paid and outstanding amounts of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLedger {
    paid: Decimal,
    remaining: Decimal,
}

impl PaymentLedger {
    /// Open a ledger for `total` with `advance` already paid.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NegativeAmount`]: the advance is negative.
    /// - [`LedgerError::AdvanceExceedsTotal`]: the advance is larger than the total.
    pub fn with_advance(total: Decimal, advance: Decimal) -> Result<Self, LedgerError> {
        if advance < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }

        if advance > total {
            return Err(LedgerError::AdvanceExceedsTotal { advance, total });
        }

        Ok(Self {
            paid: advance,
            remaining: total - advance,
        })
    }

    /// Capture the outstanding balance. `amount` must equal the remaining balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AlreadyPaid`]: nothing is outstanding.
    /// - [`LedgerError::AmountMismatch`]: `amount` differs from the outstanding balance.
    pub fn capture_balance(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        if self.is_settled() {
            return Err(LedgerError::AlreadyPaid);
        }

        if amount != self.remaining {
            return Err(LedgerError::AmountMismatch {
                expected: self.remaining,
                received: amount,
            });
        }

        self.paid += amount;
        self.remaining = Decimal::ZERO;

        Ok(amount)
    }

    pub fn paid(&self) -> Decimal {
        self.paid
    }

    pub fn remaining(&self) -> Decimal {
        self.remaining
    }

    pub fn total(&self) -> Decimal {
        self.paid + self.remaining
    }

    /// Whether the balance is fully paid.
    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }
}
