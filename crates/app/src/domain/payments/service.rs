//! Payments service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use presswork::{
    customers::CustomerUuid,
    orders::{Order, OrderUuid},
};
use rust_decimal::Decimal;
use tokio::time;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        MAX_WRITE_ATTEMPTS,
        payments::{PaymentVerifier, ProviderPayment, errors::PaymentsServiceError},
    },
    providers::{PaymentGateway, PaymentIntent},
    store::{OrdersRepository, StoreError, Versioned},
};

#[derive(Clone)]
pub struct StorePaymentsService {
    orders: Arc<dyn OrdersRepository>,
    gateway: Arc<dyn PaymentGateway>,
    verifier: PaymentVerifier,
    currency: String,
    provider_timeout: Duration,
}

impl StorePaymentsService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        gateway: Arc<dyn PaymentGateway>,
        verifier: PaymentVerifier,
        currency: impl Into<String>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            gateway,
            verifier,
            currency: currency.into(),
            provider_timeout,
        }
    }

    async fn owned_order(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Versioned<Order>, PaymentsServiceError> {
        let stored = self.orders.get_order(order).await?;

        if !stored.value.is_owned_by(customer) {
            return Err(PaymentsServiceError::Unauthorized);
        }

        Ok(stored)
    }

    async fn attach_intent(
        &self,
        order: OrderUuid,
        provider_order_id: &str,
    ) -> Result<(), PaymentsServiceError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let Versioned {
                version,
                value: mut current,
            } = self.orders.get_order(order).await?;

            current.attach_balance_intent(provider_order_id, Timestamp::now())?;

            match self.orders.replace_order(current, version).await {
                Ok(_) => return Ok(()),
                Err(StoreError::Conflict { .. }) => {
                    debug!(%order, attempt, "order changed while recording intent; re-reading");
                }
                Err(error) => return Err(error.into()),
            }
        }

        warn!(%order, "giving up on recording intent after repeated conflicts");

        Err(PaymentsServiceError::Conflict)
    }
}

impl std::fmt::Debug for StorePaymentsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePaymentsService")
            .field("currency", &self.currency)
            .field("provider_timeout", &self.provider_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentsService for StorePaymentsService {
    async fn create_balance_intent(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError> {
        let order = self.owned_order(customer, order).await?.into_inner();
        let balance = order.remaining_amount();

        if balance.is_zero() {
            return Err(PaymentsServiceError::AlreadyPaid);
        }

        let intent = time::timeout(
            self.provider_timeout,
            self.gateway
                .create_intent(balance, &self.currency, order.number().as_str()),
        )
        .await
        .map_err(|_elapsed| {
            warn!(number = %order.number(), "payment provider did not answer in time");

            PaymentsServiceError::ProviderTimeout
        })??;

        self.attach_intent(order.uuid(), &intent.provider_order_id).await?;

        info!(
            number = %order.number(),
            provider_order_id = %intent.provider_order_id,
            %balance,
            "balance payment intent created"
        );

        Ok(intent)
    }

    async fn capture_payment(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
        amount: Decimal,
        payment: ProviderPayment,
    ) -> Result<Order, PaymentsServiceError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let Versioned {
                version,
                value: mut current,
            } = self.owned_order(customer, order).await?;

            if current.remaining_amount().is_zero() {
                return Err(PaymentsServiceError::AlreadyPaid);
            }

            if let Err(error) = self.verifier.verify(&payment) {
                warn!(
                    %order,
                    provider_payment_id = %payment.provider_payment_id,
                    %error,
                    "payment signature rejected"
                );

                return Err(PaymentsServiceError::InvalidSignature);
            }

            if current.balance_intent() != Some(payment.provider_order_id.as_str()) {
                warn!(
                    %order,
                    provider_order_id = %payment.provider_order_id,
                    "payment does not match the order's balance intent"
                );

                return Err(PaymentsServiceError::IntentMismatch);
            }

            if self
                .orders
                .payment_recorded(&payment.provider_payment_id)
                .await?
            {
                warn!(
                    %order,
                    provider_payment_id = %payment.provider_payment_id,
                    "payment already applied to an order"
                );

                return Err(PaymentsServiceError::PaymentReused);
            }

            current.capture_balance(amount, &payment.provider_payment_id, Timestamp::now())?;

            match self.orders.replace_order(current, version).await {
                Ok(stored) => {
                    let captured = stored.into_inner();

                    info!(
                        number = %captured.number(),
                        provider_payment_id = %payment.provider_payment_id,
                        %amount,
                        "balance payment captured"
                    );

                    return Ok(captured);
                }
                Err(StoreError::Conflict { .. }) => {
                    debug!(%order, attempt, "order changed during capture; re-reading");
                }
                Err(error) => return Err(error.into()),
            }
        }

        warn!(%order, "giving up on capture after repeated conflicts");

        Err(PaymentsServiceError::Conflict)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Ask the provider for an intent covering the order's outstanding balance and
    /// remember it on the order. Only payments made against the latest intent can
    /// be captured.
    async fn create_balance_intent(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError>;

    /// Verify a provider payment and capture it as the order's balance.
    ///
    /// Capture happens at most once: a second capture, concurrent or not, fails with
    /// [`PaymentsServiceError::AlreadyPaid`].
    async fn capture_payment(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
        amount: Decimal,
        payment: ProviderPayment,
    ) -> Result<Order, PaymentsServiceError>;
}
