//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use presswork::{
    customers::CustomerUuid,
    orders::{NewOrder, Order, OrderError, OrderNumber, OrderUuid, price_line},
    pricing::PriceSource,
    totals::PricingPolicy,
    weights::WeightSource,
};
use tracing::{debug, info, warn};

use crate::{
    domain::{
        orders::{CheckoutRequest, errors::OrdersServiceError},
        payments::PaymentVerifier,
    },
    notifications::{Notifier, messages},
    store::{CartClaim, OrdersRepository, ProductsRepository, StoreError},
};

/// Attempts at drawing an unused order number.
pub const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct StoreOrdersService {
    products: Arc<dyn ProductsRepository>,
    orders: Arc<dyn OrdersRepository>,
    notifier: Arc<dyn Notifier>,
    verifier: PaymentVerifier,
    policy: PricingPolicy,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductsRepository>,
        orders: Arc<dyn OrdersRepository>,
        notifier: Arc<dyn Notifier>,
        verifier: PaymentVerifier,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            products,
            orders,
            notifier,
            verifier,
            policy,
        }
    }
}

impl std::fmt::Debug for StoreOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOrdersService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    async fn checkout(
        &self,
        customer: CustomerUuid,
        request: CheckoutRequest,
    ) -> Result<Order, OrdersServiceError> {
        let CheckoutRequest {
            lines: requested,
            shipping_address,
            payment_method,
            advance_paid,
            advance_payment,
            cart_revision,
        } = request;

        if requested.is_empty() {
            return Err(OrderError::NoLines.into());
        }

        let mut lines = Vec::with_capacity(requested.len());
        let mut total_weight_grams: u64 = 0;

        for line in requested {
            if line.quantity == 0 {
                return Err(OrderError::ZeroQuantity.into());
            }

            let product = match self.products.get_product(line.product).await {
                Ok(product) => product,
                Err(StoreError::NotFound) => {
                    return Err(OrdersServiceError::InvalidOrder(format!(
                        "unknown product {}",
                        line.product
                    )));
                }
                Err(error) => return Err(error.into()),
            };

            let priced = price_line(&product, line).map_err(OrderError::from)?;

            if priced.price_source == PriceSource::BasePrice && !product.tiers.is_empty() {
                warn!(
                    product = %product.uuid,
                    quantity = priced.line.quantity,
                    "no usable price tier; charging base price"
                );
            }

            if priced.weight.source == WeightSource::Default {
                warn!(product = %product.uuid, "product has no weight; using default unit weight");
            }

            total_weight_grams = total_weight_grams.saturating_add(priced.weight.line_grams);
            lines.push(priced.line);
        }

        if let Some(payment) = &advance_payment {
            if let Err(error) = self.verifier.verify(payment) {
                warn!(%customer, %error, "advance payment signature rejected");

                return Err(OrdersServiceError::InvalidSignature);
            }

            if self
                .orders
                .payment_recorded(&payment.provider_payment_id)
                .await?
            {
                warn!(
                    %customer,
                    provider_payment_id = %payment.provider_payment_id,
                    "advance payment already applied to another order"
                );

                return Err(OrdersServiceError::PaymentReused);
            }
        }

        let advance_reference = advance_payment.map(|payment| payment.provider_payment_id);
        let cart = cart_revision.map(|revision| CartClaim {
            owner: customer,
            revision,
        });

        for attempt in 1..=ORDER_NUMBER_ATTEMPTS {
            let now = Timestamp::now();
            let number = OrderNumber::generate(now, &mut rand::thread_rng());

            if self.orders.order_number_exists(&number).await? {
                debug!(%number, attempt, "order number taken; drawing another");

                continue;
            }

            let order = Order::place(
                NewOrder {
                    number,
                    customer,
                    lines: lines.clone(),
                    total_weight_grams,
                    shipping_address: shipping_address.clone(),
                    payment_method,
                    advance_paid,
                    advance_reference: advance_reference.clone(),
                },
                &self.policy,
                now,
            )?;

            match self.orders.insert_order(order, cart).await {
                Ok(stored) => {
                    let order = stored.into_inner();

                    info!(
                        %customer,
                        order = %order.uuid(),
                        number = %order.number(),
                        total = %order.totals().total,
                        remaining = %order.remaining_amount(),
                        "order placed"
                    );

                    self.notifier.notify(messages::order_placed(&order));

                    return Ok(order);
                }
                Err(StoreError::AlreadyExists) => {
                    debug!(attempt, "order number claimed concurrently; drawing another");
                }
                Err(StoreError::Conflict { expected, found }) => {
                    info!(%customer, expected, found, "cart changed during checkout");

                    return Err(OrdersServiceError::CartChanged);
                }
                Err(error) => return Err(error.into()),
            }
        }

        warn!(%customer, "no unused order number after {ORDER_NUMBER_ATTEMPTS} attempts");

        Err(OrdersServiceError::OrderNumberExhausted)
    }

    async fn get_order(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let order = self.orders.get_order(order).await?.into_inner();

        if !order.is_owned_by(customer) {
            return Err(OrdersServiceError::Unauthorized);
        }

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price the requested lines, fix the totals and store a new pending order.
    ///
    /// When the request names a cart revision the customer's cart is deleted in the
    /// same write, provided it has not changed since.
    async fn checkout(
        &self,
        customer: CustomerUuid,
        request: CheckoutRequest,
    ) -> Result<Order, OrdersServiceError>;

    /// Retrieve one of the customer's orders.
    async fn get_order(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;
}
