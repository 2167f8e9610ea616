//! Mailer Config

use std::time::Duration;

use clap::Args;

use crate::config::Secret;

/// Transactional mail settings.
#[derive(Debug, Clone, Args)]
pub struct MailerConfig {
    /// Mail API base URL
    #[arg(long, env = "PRESSWORK_MAILER_URL")]
    pub mailer_url: String,

    /// Mail API key
    #[arg(long, env = "PRESSWORK_MAILER_API_KEY", hide_env_values = true)]
    pub mailer_api_key: Secret,

    /// Sender address
    #[arg(long, env = "PRESSWORK_MAILER_SENDER")]
    pub mailer_sender: String,

    /// Mail API request timeout in seconds
    #[arg(long, env = "PRESSWORK_MAILER_TIMEOUT_SECONDS", default_value_t = 10)]
    pub mailer_timeout_seconds: u64,

    /// Delivery attempts per message
    #[arg(long, env = "PRESSWORK_MAILER_ATTEMPTS", default_value_t = 3)]
    pub mailer_attempts: u32,

    /// Delay before the first retry in milliseconds; doubles per attempt
    #[arg(long, env = "PRESSWORK_MAILER_BACKOFF_MS", default_value_t = 500)]
    pub mailer_backoff_ms: u64,
}

impl MailerConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.mailer_timeout_seconds)
    }

    /// Delay before the first retry.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.mailer_backoff_ms)
    }
}
