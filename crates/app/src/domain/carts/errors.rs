//! Carts service errors.

use presswork::{
    carts::{CartError, CartLineUuid},
    products::ProductUuid,
};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartsServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("cart line {0} not found")]
    LineNotFound(CartLineUuid),

    #[error("invalid cart change")]
    Validation(#[source] CartError),

    #[error("cart kept changing concurrently; try again")]
    Conflict,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<CartError> for CartsServiceError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::LineNotFound(line) => Self::LineNotFound(line),
            CartError::ZeroQuantity | CartError::QuantityOverflow(_) => Self::Validation(error),
        }
    }
}

impl From<StoreError> for CartsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists | StoreError::Conflict { .. } => Self::Store(error),
        }
    }
}
