//! App Context

use std::sync::Arc;

use presswork::totals::TotalsError;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    domain::{
        carts::{CartsService, StoreCartsService},
        fulfillment::{FulfillmentService, StoreFulfillmentService},
        orders::{OrdersService, StoreOrdersService},
        payments::{PaymentVerifier, PaymentsService, StorePaymentsService},
    },
    notifications::{Outbox, RetryPolicy},
    providers::{
        CarrierError, HttpCarrier, HttpMailer, HttpPaymentGateway, MailerError, PaymentGatewayError,
    },
    store::{MemoryStore, ProductsRepository},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("invalid pricing configuration")]
    Pricing(#[source] TotalsError),

    #[error("failed to build payment provider client")]
    Payments(#[source] PaymentGatewayError),

    #[error("failed to build carrier client")]
    Carrier(#[source] CarrierError),

    #[error("failed to build mail client")]
    Mailer(#[source] MailerError),
}

/// Services wired to their providers, plus the notification worker.
pub struct AppContext {
    pub products: Arc<dyn ProductsRepository>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub fulfillment: Arc<dyn FulfillmentService>,
    outbox_worker: JoinHandle<()>,
}

impl AppContext {
    /// Build application context from configuration. Must run inside a Tokio
    /// runtime, since the notification worker is spawned here.
    ///
    /// # Errors
    ///
    /// Returns an error when the pricing settings are invalid or a provider client
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let policy = config.pricing.policy().map_err(AppInitError::Pricing)?;
        let store = Arc::new(MemoryStore::new());

        let gateway = HttpPaymentGateway::new((&config.payments).into())
            .map_err(AppInitError::Payments)?;
        let carrier = HttpCarrier::new((&config.carrier).into()).map_err(AppInitError::Carrier)?;
        let mailer = HttpMailer::new((&config.mailer).into()).map_err(AppInitError::Mailer)?;

        let (outbox, outbox_worker) = Outbox::spawn(
            Arc::new(mailer),
            RetryPolicy {
                attempts: config.mailer.mailer_attempts,
                backoff: config.mailer.backoff(),
            },
        );
        let notifier = Arc::new(outbox);

        let verifier = PaymentVerifier::new(config.payments.payments_key_secret.clone());

        info!(
            currency = %config.payments.currency,
            pickup_location = %config.carrier.carrier_pickup_location,
            "application context ready"
        );

        Ok(Self {
            products: store.clone(),
            carts: Arc::new(StoreCartsService::new(store.clone(), store.clone())),
            orders: Arc::new(StoreOrdersService::new(
                store.clone(),
                store.clone(),
                notifier.clone(),
                verifier.clone(),
                policy,
            )),
            payments: Arc::new(StorePaymentsService::new(
                store.clone(),
                Arc::new(gateway),
                verifier,
                config.payments.currency.clone(),
                config.payments.timeout(),
            )),
            fulfillment: Arc::new(StoreFulfillmentService::new(
                store,
                Arc::new(carrier),
                notifier,
                config.carrier.timeout(),
                config.carrier.carrier_pickup_location.clone(),
            )),
            outbox_worker,
        })
    }

    /// Drop every service and wait for queued notifications to be delivered.
    pub async fn shutdown(self) {
        let Self {
            products,
            carts,
            orders,
            payments,
            fulfillment,
            outbox_worker,
        } = self;

        drop((products, carts, orders, payments, fulfillment));

        if let Err(error) = outbox_worker.await {
            warn!(%error, "notification worker stopped abnormally");
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use presswork::{carts::NewCartLine, customers::CustomerUuid, customization::Customization};
    use testresult::TestResult;

    use clap::Parser;

    use crate::{
        config::tests::{required_args, test_config},
        test::helpers::gift_box,
    };

    use super::*;

    #[tokio::test]
    async fn context_wires_services_to_one_store() -> TestResult {
        let context = AppContext::from_config(&test_config()?)?;

        let product = gift_box();
        let uuid = product.uuid;
        context.products.put_product(product).await?;

        let customer = CustomerUuid::new();
        let cart = context
            .carts
            .add_line(
                customer,
                NewCartLine {
                    product: uuid,
                    quantity: 3,
                    customization: Customization::new(),
                    files: Vec::new(),
                },
            )
            .await?;

        assert_eq!(cart.len(), 1);

        context.shutdown().await;

        Ok(())
    }

    #[tokio::test]
    async fn negative_tax_rate_fails_initialisation() -> TestResult {
        let config = AppConfig::try_parse_from(
            required_args()
                .into_iter()
                .chain(["--tax-rate-percent=-18"]),
        )?;

        assert!(matches!(
            AppContext::from_config(&config),
            Err(AppInitError::Pricing(TotalsError::NegativeTaxRate(_)))
        ));

        Ok(())
    }
}
