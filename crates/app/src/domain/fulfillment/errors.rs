//! Fulfillment service errors.

use presswork::orders::LifecycleError;
use thiserror::Error;

use crate::{providers::CarrierError, store::StoreError};

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("order not found")]
    NotFound,

    #[error("status change not allowed")]
    InvalidTransition(#[source] LifecycleError),

    #[error("order cannot be shipped yet")]
    PreconditionFailed(#[source] LifecycleError),

    #[error("order has already been shipped")]
    AlreadyShipped,

    #[error("carrier timed out")]
    ProviderTimeout,

    #[error("carrier error")]
    Carrier(#[source] CarrierError),

    #[error("order kept changing concurrently; try again")]
    Conflict,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<LifecycleError> for FulfillmentError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::AlreadyShipped => Self::AlreadyShipped,
            LifecycleError::NotReady(_) | LifecycleError::BalanceOutstanding(_) => {
                Self::PreconditionFailed(error)
            }
            LifecycleError::InvalidTransition { .. }
            | LifecycleError::Terminal(_)
            | LifecycleError::ShipViaCarrier => Self::InvalidTransition(error),
        }
    }
}

impl From<CarrierError> for FulfillmentError {
    fn from(error: CarrierError) -> Self {
        match error {
            CarrierError::Timeout => Self::ProviderTimeout,
            other => Self::Carrier(other),
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists | StoreError::Conflict { .. } => Self::Store(error),
        }
    }
}
