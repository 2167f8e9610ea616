//! Presswork
//!
//! Presswork is the order-fulfillment core of a customizable print-goods storefront:
//! tiered pricing, cart aggregation, order assembly, a two-stage payment ledger and
//! the production lifecycle of an order.

pub mod carts;
pub mod catalog;
pub mod customers;
pub mod customization;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod signature;
pub mod totals;
pub mod uuids;
pub mod weights;
