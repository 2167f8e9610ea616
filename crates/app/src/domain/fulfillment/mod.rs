//! Fulfillment

pub mod errors;
pub mod service;

pub use errors::FulfillmentError;
pub use service::*;
