//! Application configuration
//!
//! Every setting can be given as a flag or through the environment; a `.env` file
//! is loaded first when present.

use clap::Parser;

mod carrier;
mod logging;
mod mailer;
mod payments;
mod pricing;
mod secret;

pub use carrier::CarrierConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use mailer::MailerConfig;
pub use payments::PaymentsConfig;
pub use pricing::PricingConfig;
pub use secret::Secret;

/// Presswork application configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "presswork", about = "Presswork order fulfillment", long_about = None)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Shipping tariff and tax settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Payment provider settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Shipping carrier settings.
    #[command(flatten)]
    pub carrier: CarrierConfig,

    /// Transactional mail settings.
    #[command(flatten)]
    pub mailer: MailerConfig,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
