//! Order status and its history
//!
//! The history is the source of truth: entries are only ever appended, and the
//! order's current status is the status of the last entry.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Production and delivery status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Printing,
    Ready,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Position along the happy path; `Cancelled` sits outside it.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Processing => Some(2),
            Self::Printing => Some(3),
            Self::Ready => Some(4),
            Self::Shipped => Some(5),
            Self::Delivered => Some(6),
            Self::Cancelled => None,
        }
    }

    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Check that an admin may move an order from `self` to `next`.
    ///
    /// Orders move forward only (steps may be skipped up to `Ready`), `Shipped` is
    /// reserved for carrier handoff, `Delivered` follows `Shipped`, and `Cancelled`
    /// is reachable from every non-terminal status.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Terminal`]: `self` is `Delivered` or `Cancelled`.
    /// - [`LifecycleError::ShipViaCarrier`]: `next` is `Shipped`.
    /// - [`LifecycleError::InvalidTransition`]: the move is backwards or skips past `Ready`.
    pub fn check_transition(self, next: Self) -> Result<(), LifecycleError> {
        if self.is_terminal() {
            return Err(LifecycleError::Terminal(self));
        }

        let allowed = match next {
            Self::Cancelled => true,
            Self::Shipped => return Err(LifecycleError::ShipViaCarrier),
            Self::Delivered => self == Self::Shipped,
            _ => match (self.rank(), next.rank()) {
                (Some(from), Some(to)) => to > from && self != Self::Shipped,
                _ => false,
            },
        };

        if allowed {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition { from: self, to: next })
        }
    }

    /// Lowercase name, as stored.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Printing => "printing",
            Self::Ready => "ready",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order is {0} and can no longer change")]
    Terminal(OrderStatus),

    #[error("orders become shipped only through carrier handoff")]
    ShipViaCarrier,

    #[error("order must be ready to ship, but is {0}")]
    NotReady(OrderStatus),

    #[error("balance of {0} must be paid before shipping")]
    BalanceOutstanding(Decimal),

    #[error("a shipment already exists for this order")]
    AlreadyShipped,
}

/// One appended status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub at: Timestamp,
}

/// Append-only status log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory {
    entries: Vec<StatusEntry>,
}

impl StatusHistory {
    /// Start a history with its first entry.
    pub fn start(status: OrderStatus, note: Option<String>, at: Timestamp) -> Self {
        Self {
            entries: vec![StatusEntry { status, note, at }],
        }
    }

    /// Append an entry and return the new current status.
    pub fn append(&mut self, status: OrderStatus, note: Option<String>, at: Timestamp) -> OrderStatus {
        self.entries.push(StatusEntry { status, note, at });

        self.current()
    }

    /// Status of the last entry.
    pub fn current(&self) -> OrderStatus {
        self.entries
            .last()
            .map_or(OrderStatus::Pending, |entry| entry.status)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for histories built with [`StatusHistory::start`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
