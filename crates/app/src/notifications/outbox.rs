//! Notification outbox.
//!
//! Services hand emails to a [`Notifier`] and move on; delivery happens on a
//! background worker, and failures are logged rather than reported to the caller.

use std::{sync::Arc, time::Duration};

use mockall::automock;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time,
};
use tracing::{debug, info, warn};

use crate::{
    notifications::Email,
    providers::{Mailer, MailerError},
};

#[automock]
pub trait Notifier: Send + Sync {
    /// Queue an email for delivery. Never blocks and never fails.
    fn notify(&self, email: Email);
}

/// Delivery attempts per message and the delay before the first retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Sending half of the outbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: UnboundedSender<Email>,
}

impl Outbox {
    /// Start the delivery worker. It stops once every [`Outbox`] handle is dropped
    /// and the queue is drained.
    pub fn spawn(mailer: Arc<dyn Mailer>, policy: RetryPolicy) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, mailer, policy));

        (Self { sender }, worker)
    }
}

impl Notifier for Outbox {
    fn notify(&self, email: Email) {
        let subject = email.subject.clone();

        if self.sender.send(email).is_err() {
            warn!(%subject, "notification outbox is closed; dropping email");
        }
    }
}

async fn run_worker(mut receiver: UnboundedReceiver<Email>, mailer: Arc<dyn Mailer>, policy: RetryPolicy) {
    while let Some(email) = receiver.recv().await {
        match deliver(mailer.as_ref(), &email, policy).await {
            Ok(()) => info!(recipient = %email.recipient, subject = %email.subject, "email delivered"),
            Err(error) => warn!(
                recipient = %email.recipient,
                subject = %email.subject,
                %error,
                "email delivery failed; giving up"
            ),
        }
    }

    debug!("notification outbox drained");
}

async fn deliver(mailer: &dyn Mailer, email: &Email, policy: RetryPolicy) -> Result<(), MailerError> {
    let mut backoff = policy.backoff;
    let mut attempt = 1;

    loop {
        match mailer.send(email).await {
            Ok(()) => return Ok(()),
            Err(error) if attempt >= policy.attempts.max(1) => return Err(error),
            Err(error) => {
                debug!(attempt, %error, "email delivery failed; retrying");

                time::sleep(backoff).await;

                backoff = backoff.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}
