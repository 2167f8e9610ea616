//! Payment provider client.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{PaymentsConfig, Secret};

/// An amount the customer is asked to pay through the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    /// Provider's order reference, later signed together with the payment id.
    #[serde(rename = "id")]
    pub provider_order_id: String,

    /// Amount in minor currency units.
    #[serde(rename = "amount")]
    pub amount_minor: i64,

    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment provider request timed out")]
    Timeout,

    #[error("amount {0} cannot be expressed in minor units")]
    InvalidAmount(Decimal),

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("unexpected response from payment provider: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for PaymentGatewayError {
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
pub trait PaymentGateway: Send + Sync {
    /// Open a payment intent for `amount` (major units) in `currency`.
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}

/// Convert a major-unit amount to minor units.
///
/// # Errors
///
/// Returns [`PaymentGatewayError::InvalidAmount`] for negative or oversized amounts.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentGatewayError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .filter(|minor| !minor.is_sign_negative())
        .and_then(|minor| minor.round_dp(0).to_i64())
        .ok_or(PaymentGatewayError::InvalidAmount(amount))
}

/// Payment provider HTTP API settings.
#[derive(Debug, Clone)]
pub struct PaymentGatewaySettings {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: Secret,
    pub timeout: Duration,
}

impl From<&PaymentsConfig> for PaymentGatewaySettings {
    fn from(config: &PaymentsConfig) -> Self {
        Self {
            base_url: config.payments_url.trim_end_matches('/').to_string(),
            key_id: config.payments_key_id.clone(),
            key_secret: config.payments_key_secret.clone(),
            timeout: config.timeout(),
        }
    }
}

/// HTTP client for the payment provider.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    settings: PaymentGatewaySettings,
    http: Client,
}

impl HttpPaymentGateway {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: PaymentGatewaySettings) -> Result<Self, PaymentGatewayError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self { settings, http })
    }
}

#[derive(Debug, Serialize)]
struct CreateIntentRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let amount_minor = to_minor_units(amount)?;

        debug!(amount_minor, currency, receipt, "creating payment intent");

        let response = self
            .http
            .post(format!("{}/orders", self.settings.base_url))
            .basic_auth(&self.settings.key_id, Some(self.settings.key_secret.expose()))
            .json(&CreateIntentRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(PaymentGatewayError::UnexpectedResponse(format!(
                "create intent failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
