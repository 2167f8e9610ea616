//! Orders service errors.

use presswork::orders::OrderError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("order belongs to another customer")]
    Unauthorized,

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("invalid checkout data")]
    Validation(#[source] OrderError),

    #[error("advance payment signature is invalid")]
    InvalidSignature,

    #[error("advance payment was already applied to an order")]
    PaymentReused,

    #[error("cart changed during checkout; review it and try again")]
    CartChanged,

    #[error("could not allocate a unique order number")]
    OrderNumberExhausted,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<OrderError> for OrdersServiceError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::NoLines => Self::InvalidOrder(error.to_string()),
            OrderError::ZeroQuantity
            | OrderError::IncompleteAddress(_)
            | OrderError::Ledger(_)
            | OrderError::Totals(_) => Self::Validation(error),
        }
    }
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists | StoreError::Conflict { .. } => Self::Store(error),
        }
    }
}
