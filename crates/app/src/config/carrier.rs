//! Shipping Carrier Config

use std::time::Duration;

use clap::Args;
use jiff::SignedDuration;

use crate::config::Secret;

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Shipping carrier settings.
#[derive(Debug, Clone, Args)]
pub struct CarrierConfig {
    /// Carrier API base URL
    #[arg(long, env = "PRESSWORK_CARRIER_URL")]
    pub carrier_url: String,

    /// Carrier account email
    #[arg(long, env = "PRESSWORK_CARRIER_EMAIL")]
    pub carrier_email: String,

    /// Carrier account password
    #[arg(long, env = "PRESSWORK_CARRIER_PASSWORD", hide_env_values = true)]
    pub carrier_password: Secret,

    /// Pickup location registered with the carrier
    #[arg(long, env = "PRESSWORK_CARRIER_PICKUP_LOCATION", default_value = "Primary")]
    pub carrier_pickup_location: String,

    /// How long an auth token is reused before re-authenticating, in hours
    #[arg(
        long,
        env = "PRESSWORK_CARRIER_TOKEN_TTL_HOURS",
        default_value_t = 216,
        value_parser = clap::value_parser!(u32).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    pub carrier_token_ttl_hours: u32,

    /// Carrier request timeout in seconds
    #[arg(long, env = "PRESSWORK_CARRIER_TIMEOUT_SECONDS", default_value_t = 15)]
    pub carrier_timeout_seconds: u64,
}

impl CarrierConfig {
    /// Auth token lifetime.
    pub fn token_ttl(&self) -> SignedDuration {
        SignedDuration::from_hours(i64::from(self.carrier_token_ttl_hours))
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.carrier_timeout_seconds)
    }
}
