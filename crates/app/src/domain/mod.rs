//! Presswork Domain Concerns

pub mod carts;
pub mod fulfillment;
pub mod orders;
pub mod payments;

/// Read-modify-write attempts before a concurrently changing document is reported
/// as a conflict.
pub(crate) const MAX_WRITE_ATTEMPTS: usize = 5;
