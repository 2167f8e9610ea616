//! Customer notifications.

pub mod email;
pub mod messages;
pub mod outbox;

pub use email::Email;
pub use outbox::{Notifier, Outbox, RetryPolicy};
