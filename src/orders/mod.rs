//! Orders
//!
//! An [`Order`] is created once at checkout and never deleted. Its totals are
//! computed at creation and never recalculated; payments only move money between
//! `paid` and `remaining`; status changes are appended to its history.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    customers::CustomerUuid,
    totals::{OrderTotals, PricingPolicy, TotalsError},
    uuids::TypedUuid,
};

pub mod ledger;
pub mod lines;
pub mod number;
pub mod status;

pub use ledger::{LedgerError, PaymentLedger};
pub use lines::{LineRequest, OrderLine, PricedLine, price_line};
pub use number::OrderNumber;
pub use status::{LifecycleError, OrderStatus, StatusEntry, StatusHistory};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Note recorded on the first history entry.
pub const ORDER_PLACED_NOTE: &str = "Order placed";

/// Errors raised while placing an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("an order needs at least one line")]
    NoLines,

    #[error("line quantity must be at least 1")]
    ZeroQuantity,

    #[error("shipping address is missing {0}")]
    IncompleteAddress(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// Delivery address and contact for an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IncompleteAddress`] naming the first blank field.
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(OrderError::IncompleteAddress(field)),
            None => Ok(()),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid through the online payment provider.
    Online,

    /// Advance online, balance collected on delivery.
    CashOnDelivery,
}

/// Settlement status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Carrier references stored after a successful handoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub carrier_order_id: String,
    pub shipment_id: String,
    pub tracking_code: Option<String>,
    pub created_at: Timestamp,
}

/// Data needed to place an order. Lines are already priced.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub customer: CustomerUuid,
    pub lines: Vec<OrderLine>,
    pub total_weight_grams: u64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub advance_paid: Decimal,

    /// Provider payment id of the advance, when one was presented.
    pub advance_reference: Option<String>,
}

/// Order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    uuid: OrderUuid,
    number: OrderNumber,
    customer: CustomerUuid,
    lines: Vec<OrderLine>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    status: OrderStatus,
    totals: OrderTotals,
    ledger: PaymentLedger,
    history: StatusHistory,
    #[serde(default)]
    balance_intent: Option<String>,
    #[serde(default)]
    payment_references: Vec<String>,
    shipment: Option<Shipment>,
    total_weight_grams: u64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Place an order: freeze totals, open the ledger and start the history.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NoLines`] / [`OrderError::ZeroQuantity`]: invalid lines.
    /// - [`OrderError::IncompleteAddress`]: a required address field is blank.
    /// - [`OrderError::Ledger`]: the declared advance is negative or above the total.
    /// - [`OrderError::Totals`]: arithmetic overflow.
    pub fn place(new: NewOrder, policy: &PricingPolicy, now: Timestamp) -> Result<Self, OrderError> {
        if new.lines.is_empty() {
            return Err(OrderError::NoLines);
        }

        if new.lines.iter().any(|line| line.quantity == 0) {
            return Err(OrderError::ZeroQuantity);
        }

        new.shipping_address.validate()?;

        let subtotal = new
            .lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total))
            .ok_or(TotalsError::Overflow)?;

        let totals = OrderTotals::compute(policy, subtotal, new.total_weight_grams)?;
        let ledger = PaymentLedger::with_advance(totals.total, new.advance_paid)?;

        let payment_status = if ledger.is_settled() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };

        let history = StatusHistory::start(
            OrderStatus::Pending,
            Some(ORDER_PLACED_NOTE.to_string()),
            now,
        );

        Ok(Self {
            uuid: OrderUuid::new(),
            number: new.number,
            customer: new.customer,
            lines: new.lines,
            shipping_address: new.shipping_address,
            payment_method: new.payment_method,
            payment_status,
            status: history.current(),
            totals,
            ledger,
            history,
            balance_intent: None,
            payment_references: new.advance_reference.into_iter().collect(),
            shipment: None,
            total_weight_grams: new.total_weight_grams,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    pub fn customer(&self) -> CustomerUuid {
        self.customer
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    pub fn paid_amount(&self) -> Decimal {
        self.ledger.paid()
    }

    pub fn remaining_amount(&self) -> Decimal {
        self.ledger.remaining()
    }

    pub fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// Provider order id a balance payment must be made against.
    pub fn balance_intent(&self) -> Option<&str> {
        self.balance_intent.as_deref()
    }

    /// Provider payment ids already applied to this order.
    pub fn payment_references(&self) -> &[String] {
        &self.payment_references
    }

    /// Whether `provider_payment_id` was already applied to this order.
    pub fn has_payment(&self, provider_payment_id: &str) -> bool {
        self.payment_references
            .iter()
            .any(|reference| reference == provider_payment_id)
    }

    pub fn shipment(&self) -> Option<&Shipment> {
        self.shipment.as_ref()
    }

    pub fn total_weight_grams(&self) -> u64 {
        self.total_weight_grams
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether `customer` owns this order.
    pub fn is_owned_by(&self, customer: CustomerUuid) -> bool {
        self.customer == customer
    }

    /// Bind the outstanding balance to a provider order. A newer intent replaces an
    /// older one.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyPaid`] when nothing is outstanding.
    pub fn attach_balance_intent(
        &mut self,
        provider_order_id: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if self.ledger.is_settled() {
            return Err(LedgerError::AlreadyPaid);
        }

        self.balance_intent = Some(provider_order_id.into());
        self.updated_at = now;

        Ok(())
    }

    /// Capture the outstanding balance. Status is unchanged; the capture is logged
    /// against the current status.
    ///
    /// # Errors
    ///
    /// See [`PaymentLedger::capture_balance`].
    pub fn capture_balance(
        &mut self,
        amount: Decimal,
        payment_reference: &str,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.ledger.capture_balance(amount)?;
        self.payment_status = PaymentStatus::Paid;
        self.payment_references.push(payment_reference.to_string());

        self.record(
            self.status,
            Some(format!(
                "Balance payment of {amount} received (payment {payment_reference})"
            )),
            now,
        );

        Ok(())
    }

    /// Move the order to `next`, recording an optional note.
    ///
    /// # Errors
    ///
    /// See [`OrderStatus::check_transition`].
    pub fn transition(
        &mut self,
        next: OrderStatus,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        self.status.check_transition(next)?;
        self.record(next, note, now);

        Ok(())
    }

    /// Check that the order may be handed to the carrier.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::AlreadyShipped`]: a shipment is already recorded.
    /// - [`LifecycleError::NotReady`]: status is not `ready`.
    /// - [`LifecycleError::BalanceOutstanding`]: the balance is unpaid.
    pub fn ensure_shippable(&self) -> Result<(), LifecycleError> {
        if self.shipment.is_some() {
            return Err(LifecycleError::AlreadyShipped);
        }

        if self.status != OrderStatus::Ready {
            return Err(LifecycleError::NotReady(self.status));
        }

        if !self.ledger.is_settled() {
            return Err(LifecycleError::BalanceOutstanding(self.ledger.remaining()));
        }

        Ok(())
    }

    /// Store the carrier's references and mark the order shipped.
    ///
    /// # Errors
    ///
    /// See [`Order::ensure_shippable`].
    pub fn record_shipment(&mut self, shipment: Shipment, now: Timestamp) -> Result<(), LifecycleError> {
        self.ensure_shippable()?;

        let note = format!(
            "Shipment created with carrier order {}",
            shipment.carrier_order_id
        );

        self.shipment = Some(shipment);
        self.record(OrderStatus::Shipped, Some(note), now);

        Ok(())
    }

    /// Whether every money and history invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.totals.is_consistent()
            && self.ledger.total() == self.totals.total
            && !self.ledger.remaining().is_sign_negative()
            && self.history.current() == self.status
    }

    fn record(&mut self, status: OrderStatus, note: Option<String>, now: Timestamp) {
        self.status = self.history.append(status, note, now);
        self.updated_at = now;
    }
}
