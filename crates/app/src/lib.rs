//! Presswork application services: carts, checkout, payments and fulfillment
//! wired to a document store, external providers and a notification outbox.

pub mod config;
pub mod context;
pub mod domain;
pub mod notifications;
pub mod observability;
pub mod providers;
pub mod store;

#[cfg(test)]
mod test;
