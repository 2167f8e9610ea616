//! Payment Provider Config

use std::time::Duration;

use clap::Args;

use crate::config::Secret;

/// Payment provider settings.
#[derive(Debug, Clone, Args)]
pub struct PaymentsConfig {
    /// Payment provider API base URL
    #[arg(long, env = "PRESSWORK_PAYMENTS_URL")]
    pub payments_url: String,

    /// Payment provider key id
    #[arg(long, env = "PRESSWORK_PAYMENTS_KEY_ID")]
    pub payments_key_id: String,

    /// Payment provider key secret, also used to verify payment signatures
    #[arg(long, env = "PRESSWORK_PAYMENTS_KEY_SECRET", hide_env_values = true)]
    pub payments_key_secret: Secret,

    /// ISO currency code for payment intents
    #[arg(long, env = "PRESSWORK_CURRENCY", default_value = "INR")]
    pub currency: String,

    /// Payment provider request timeout in seconds
    #[arg(long, env = "PRESSWORK_PAYMENTS_TIMEOUT_SECONDS", default_value_t = 10)]
    pub payments_timeout_seconds: u64,
}

impl PaymentsConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.payments_timeout_seconds)
    }
}
