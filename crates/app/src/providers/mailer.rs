//! Transactional mail client.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::{MailerConfig, Secret},
    notifications::Email,
};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("mail request timed out")]
    Timeout,

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("mail provider rejected the message: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for MailerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error)
        }
    }
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    async fn send(&self, email: &Email) -> Result<(), MailerError>;
}

/// Mail API settings.
#[derive(Debug, Clone)]
pub struct MailerSettings {
    pub base_url: String,
    pub api_key: Secret,
    pub sender: String,
    pub timeout: Duration,
}

impl From<&MailerConfig> for MailerSettings {
    fn from(config: &MailerConfig) -> Self {
        Self {
            base_url: config.mailer_url.trim_end_matches('/').to_string(),
            api_key: config.mailer_api_key.clone(),
            sender: config.mailer_sender.clone(),
            timeout: config.timeout(),
        }
    }
}

/// HTTP client for the mail provider.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    settings: MailerSettings,
    http: Client,
}

impl HttpMailer {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: MailerSettings) -> Result<Self, MailerError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self { settings, http })
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: String,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailerError> {
        let response = self
            .http
            .post(format!("{}/emails", self.settings.base_url))
            .bearer_auth(self.settings.api_key.expose())
            .json(&SendEmailRequest {
                from: &self.settings.sender,
                to: &email.recipient,
                subject: &email.subject,
                html: &email.html_body,
                text: email.text_body(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(MailerError::Rejected(format!("status {status}: {text}")));
        }

        Ok(())
    }
}
