//! Payments service errors.

use presswork::orders::LedgerError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{providers::PaymentGatewayError, store::StoreError};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("order not found")]
    NotFound,

    #[error("order belongs to another customer")]
    Unauthorized,

    #[error("order is already fully paid")]
    AlreadyPaid,

    #[error("payment signature is invalid")]
    InvalidSignature,

    #[error("payment was not made against this order's balance")]
    IntentMismatch,

    #[error("payment was already applied to an order")]
    PaymentReused,

    #[error("balance due is {expected}, but {received} was paid")]
    AmountMismatch { expected: Decimal, received: Decimal },

    #[error("invalid payment")]
    Validation(#[source] LedgerError),

    #[error("payment provider timed out")]
    ProviderTimeout,

    #[error("payment provider error")]
    Provider(#[source] PaymentGatewayError),

    #[error("order kept changing concurrently; try again")]
    Conflict,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<LedgerError> for PaymentsServiceError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::AlreadyPaid => Self::AlreadyPaid,
            LedgerError::AmountMismatch { expected, received } => {
                Self::AmountMismatch { expected, received }
            }
            LedgerError::NegativeAmount | LedgerError::AdvanceExceedsTotal { .. } => {
                Self::Validation(error)
            }
        }
    }
}

impl From<PaymentGatewayError> for PaymentsServiceError {
    fn from(error: PaymentGatewayError) -> Self {
        match error {
            PaymentGatewayError::Timeout => Self::ProviderTimeout,
            other => Self::Provider(other),
        }
    }
}

impl From<StoreError> for PaymentsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists | StoreError::Conflict { .. } => Self::Store(error),
        }
    }
}
