//! Customers

use crate::uuids::TypedUuid;

/// Storefront customer
#[derive(Debug)]
pub struct Customer;

/// Customer UUID
pub type CustomerUuid = TypedUuid<Customer>;
