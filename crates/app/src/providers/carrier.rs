//! Shipping carrier client.

use std::time::Duration;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use presswork::orders::ShippingAddress;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::{CarrierConfig, Secret},
    providers::token_cache::TokenCache,
};

/// How the consignee settles with the carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentMode {
    Prepaid,
    #[serde(rename = "COD")]
    CashOnDelivery,
}

/// One line of a consignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentItem {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub selling_price: Decimal,
}

/// Header carrying the order number, so the carrier can collapse repeated
/// submissions of one order into a single shipment.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Shipment handed to the carrier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRequest {
    pub order_id: String,
    pub order_date: Timestamp,
    pub pickup_location: String,
    pub consignee: ShippingAddress,
    pub items: Vec<ShipmentItem>,
    pub payment_mode: PaymentMode,
    pub sub_total: Decimal,
    pub collectable_amount: Decimal,
    pub weight_kg: Decimal,
}

/// References returned by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarrierShipment {
    pub carrier_order_id: String,
    pub shipment_id: String,
    #[serde(default)]
    pub tracking_code: Option<String>,
}

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("carrier request timed out")]
    Timeout,

    #[error("carrier rejected the credentials")]
    Unauthorized,

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("unexpected response from carrier: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for CarrierError {
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
pub trait Carrier: Send + Sync {
    /// Create a shipment for a ready order.
    async fn create_shipment(&self, request: &ShipmentRequest) -> Result<CarrierShipment, CarrierError>;
}

/// Carrier HTTP API settings.
#[derive(Debug, Clone)]
pub struct CarrierSettings {
    pub base_url: String,
    pub email: String,
    pub password: Secret,
    pub token_ttl: SignedDuration,
    pub timeout: Duration,
}

impl From<&CarrierConfig> for CarrierSettings {
    fn from(config: &CarrierConfig) -> Self {
        Self {
            base_url: config.carrier_url.trim_end_matches('/').to_string(),
            email: config.carrier_email.clone(),
            password: config.carrier_password.clone(),
            token_ttl: config.token_ttl(),
            timeout: config.timeout(),
        }
    }
}

/// HTTP client for the shipping carrier.
#[derive(Debug)]
pub struct HttpCarrier {
    settings: CarrierSettings,
    http: Client,
    tokens: TokenCache,
}

impl HttpCarrier {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: CarrierSettings) -> Result<Self, CarrierError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            tokens: TokenCache::new(settings.token_ttl),
            settings,
            http,
        })
    }

    /// Exchange the account credentials for an auth token.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or when the credentials are refused.
    pub async fn authenticate(&self) -> Result<Secret, CarrierError> {
        debug!(email = %self.settings.email, "authenticating with carrier");

        let response = self
            .http
            .post(format!("{}/auth/login", self.settings.base_url))
            .json(&serde_json::json!({
                "email": self.settings.email,
                "password": self.settings.password.expose(),
            }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let parsed: LoginResponse = response.json().await?;

                Ok(Secret::new(parsed.token))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CarrierError::Unauthorized),
            status => {
                let text = response.text().await.unwrap_or_default();

                Err(CarrierError::UnexpectedResponse(format!(
                    "login failed with status {status}: {text}"
                )))
            }
        }
    }

    async fn token(&self) -> Result<Secret, CarrierError> {
        self.tokens
            .get_or_refresh(Timestamp::now(), || self.authenticate())
            .await
    }

    async fn post_shipment(
        &self,
        token: &Secret,
        request: &ShipmentRequest,
    ) -> Result<CarrierShipment, CarrierError> {
        let response = self
            .http
            .post(format!("{}/orders/create/adhoc", self.settings.base_url))
            .bearer_auth(token.expose())
            .header(IDEMPOTENCY_KEY_HEADER, &request.order_id)
            .json(request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(CarrierError::Unauthorized),
            status => {
                let text = response.text().await.unwrap_or_default();

                Err(CarrierError::UnexpectedResponse(format!(
                    "create shipment failed with status {status}: {text}"
                )))
            }
        }
    }
}

#[async_trait]
impl Carrier for HttpCarrier {
    async fn create_shipment(&self, request: &ShipmentRequest) -> Result<CarrierShipment, CarrierError> {
        let token = self.token().await?;

        match self.post_shipment(&token, request).await {
            Err(CarrierError::Unauthorized) => {
                warn!(order_id = %request.order_id, "carrier token rejected; re-authenticating");

                self.tokens.invalidate().await;

                let token = self.token().await?;

                self.post_shipment(&token, request).await
            }
            result => result,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::test::{helpers::address, http::StubServer};

    use super::*;

    const LOGIN_T1: (u16, &str) = (200, r#"{"token":"t1"}"#);
    const LOGIN_T2: (u16, &str) = (200, r#"{"token":"t2"}"#);
    const CREATED: (u16, &str) = (
        200,
        r#"{"carrier_order_id":"CO-9","shipment_id":"SH-9","tracking_code":"AWB123"}"#,
    );
    const EXPIRED: (u16, &str) = (401, r#"{"message":"token expired"}"#);

    fn carrier(base_url: &str) -> Result<HttpCarrier, CarrierError> {
        HttpCarrier::new(CarrierSettings {
            base_url: base_url.to_string(),
            email: "ops@example.com".to_string(),
            password: Secret::new("pw"),
            token_ttl: SignedDuration::from_hours(1),
            timeout: Duration::from_secs(5),
        })
    }

    fn request() -> ShipmentRequest {
        ShipmentRequest {
            order_id: "PS26101700042".to_string(),
            order_date: Timestamp::now(),
            pickup_location: "Primary".to_string(),
            consignee: address(),
            items: vec![ShipmentItem {
                name: "Gift box".to_string(),
                sku: "gift-box".to_string(),
                units: 10,
                selling_price: dec!(100),
            }],
            payment_mode: PaymentMode::Prepaid,
            sub_total: dec!(1264),
            collectable_amount: dec!(0),
            weight_kg: dec!(1.2),
        }
    }

    #[test]
    fn payment_mode_uses_carrier_names() -> TestResult {
        assert_eq!(serde_json::to_string(&PaymentMode::Prepaid)?, "\"Prepaid\"");
        assert_eq!(serde_json::to_string(&PaymentMode::CashOnDelivery)?, "\"COD\"");

        Ok(())
    }

    #[test]
    fn shipment_response_tolerates_missing_tracking_code() -> TestResult {
        let shipment: CarrierShipment =
            serde_json::from_str(r#"{"carrier_order_id":"CO-1","shipment_id":"SH-1"}"#)?;

        assert_eq!(shipment.tracking_code, None);

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_carrier_fails_without_panicking() -> TestResult {
        let carrier = HttpCarrier::new(CarrierSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            email: "ops@example.com".to_string(),
            password: Secret::new("pw"),
            token_ttl: SignedDuration::from_hours(1),
            timeout: Duration::from_millis(500),
        })?;

        let result = carrier.authenticate().await;

        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn token_is_cached_between_shipments() -> TestResult {
        let server = StubServer::start(vec![LOGIN_T1, CREATED, CREATED]).await?;
        let carrier = carrier(server.base_url())?;

        carrier.create_shipment(&request()).await?;
        let second = carrier.create_shipment(&request()).await?;

        assert_eq!(second.tracking_code.as_deref(), Some("AWB123"));
        assert_eq!(
            server.paths().await,
            ["/auth/login", "/orders/create/adhoc", "/orders/create/adhoc"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejected_token_triggers_one_login_and_a_retry() -> TestResult {
        let server = StubServer::start(vec![LOGIN_T1, EXPIRED, LOGIN_T2, CREATED]).await?;
        let carrier = carrier(server.base_url())?;

        let created = carrier.create_shipment(&request()).await?;

        assert_eq!(created.carrier_order_id, "CO-9");

        let requests = server.requests().await;
        let paths: Vec<&str> = requests.iter().map(|request| request.path.as_str()).collect();
        let auth: Vec<Option<&str>> = requests
            .iter()
            .map(|request| request.header("authorization"))
            .collect();

        assert_eq!(
            paths,
            ["/auth/login", "/orders/create/adhoc", "/auth/login", "/orders/create/adhoc"]
        );
        assert_eq!(auth, [None, Some("Bearer t1"), None, Some("Bearer t2")]);
        assert!(requests.iter().all(|request| request.method == "POST"));

        Ok(())
    }

    #[tokio::test]
    async fn second_rejection_is_unauthorized() -> TestResult {
        let server = StubServer::start(vec![LOGIN_T1, EXPIRED, LOGIN_T2, EXPIRED, CREATED]).await?;
        let carrier = carrier(server.base_url())?;

        let result = carrier.create_shipment(&request()).await;

        assert!(matches!(result, Err(CarrierError::Unauthorized)));
        assert_eq!(server.requests().await.len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn refused_login_is_unauthorized() -> TestResult {
        let server = StubServer::start(vec![(403, r#"{"message":"bad credentials"}"#)]).await?;
        let carrier = carrier(server.base_url())?;

        let result = carrier.create_shipment(&request()).await;

        assert!(matches!(result, Err(CarrierError::Unauthorized)));
        assert_eq!(server.paths().await, ["/auth/login"]);

        Ok(())
    }

    #[tokio::test]
    async fn other_failures_are_unexpected_responses() -> TestResult {
        let server = StubServer::start(vec![LOGIN_T1, (422, r#"{"message":"bad pincode"}"#)]).await?;
        let carrier = carrier(server.base_url())?;

        let result = carrier.create_shipment(&request()).await;

        assert!(matches!(
            result,
            Err(CarrierError::UnexpectedResponse(message))
                if message.contains("422") && message.contains("bad pincode")
        ));
        assert_eq!(server.requests().await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn shipments_carry_the_order_number_as_idempotency_key() -> TestResult {
        let server = StubServer::start(vec![LOGIN_T1, CREATED]).await?;
        let carrier = carrier(server.base_url())?;

        carrier.create_shipment(&request()).await?;

        let requests = server.requests().await;
        let shipment = requests.last().ok_or("no shipment request")?;
        let body: serde_json::Value = serde_json::from_str(&shipment.body)?;

        assert_eq!(shipment.header(IDEMPOTENCY_KEY_HEADER), Some("PS26101700042"));
        assert_eq!(body.get("payment_mode"), Some(&serde_json::json!("Prepaid")));
        assert_eq!(body.get("order_id"), Some(&serde_json::json!("PS26101700042")));

        Ok(())
    }
}
