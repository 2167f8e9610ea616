//! Fulfillment service.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use presswork::orders::{Order, OrderStatus, OrderUuid, Shipment};
use rust_decimal::Decimal;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::{
    domain::{MAX_WRITE_ATTEMPTS, fulfillment::errors::FulfillmentError},
    notifications::{Notifier, messages},
    providers::{Carrier, PaymentMode, ShipmentItem, ShipmentRequest},
    store::{OrdersRepository, StoreError, Versioned},
};

#[derive(Clone)]
pub struct StoreFulfillmentService {
    orders: Arc<dyn OrdersRepository>,
    carrier: Arc<dyn Carrier>,
    notifier: Arc<dyn Notifier>,
    carrier_timeout: Duration,
    pickup_location: String,
}

impl StoreFulfillmentService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        carrier: Arc<dyn Carrier>,
        notifier: Arc<dyn Notifier>,
        carrier_timeout: Duration,
        pickup_location: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            carrier,
            notifier,
            carrier_timeout,
            pickup_location: pickup_location.into(),
        }
    }
}

impl std::fmt::Debug for StoreFulfillmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreFulfillmentService")
            .field("carrier_timeout", &self.carrier_timeout)
            .field("pickup_location", &self.pickup_location)
            .finish_non_exhaustive()
    }
}

/// Build the carrier consignment for an order.
///
/// Orders with a balance still due are sent as cash on delivery for that balance.
pub fn shipment_request(order: &Order, pickup_location: &str) -> ShipmentRequest {
    let remaining = order.remaining_amount();

    let payment_mode = if remaining.is_zero() {
        PaymentMode::Prepaid
    } else {
        PaymentMode::CashOnDelivery
    };

    ShipmentRequest {
        order_id: order.number().to_string(),
        order_date: order.created_at(),
        pickup_location: pickup_location.to_string(),
        consignee: order.shipping_address().clone(),
        items: order
            .lines()
            .iter()
            .map(|line| ShipmentItem {
                name: line.name.clone(),
                sku: line.product.to_string(),
                units: line.quantity,
                selling_price: line.unit_price,
            })
            .collect(),
        payment_mode,
        sub_total: order.totals().total,
        collectable_amount: remaining,
        weight_kg: Decimal::from(order.total_weight_grams()) / Decimal::ONE_THOUSAND,
    }
}

#[async_trait]
impl FulfillmentService for StoreFulfillmentService {
    async fn transition(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, FulfillmentError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let Versioned {
                version,
                value: mut current,
            } = self.orders.get_order(order).await?;

            let from = current.status();

            current.transition(to, note.clone(), Timestamp::now())?;

            match self.orders.replace_order(current, version).await {
                Ok(stored) => {
                    let updated = stored.into_inner();

                    info!(number = %updated.number(), %from, %to, "order status changed");

                    if to == OrderStatus::Ready {
                        self.notifier.notify(messages::order_ready(&updated));
                    }

                    return Ok(updated);
                }
                Err(StoreError::Conflict { .. }) => {
                    debug!(%order, attempt, "order changed during transition; re-reading");
                }
                Err(error) => return Err(error.into()),
            }
        }

        warn!(%order, "giving up on transition after repeated conflicts");

        Err(FulfillmentError::Conflict)
    }

    async fn ship(&self, order: OrderUuid) -> Result<Order, FulfillmentError> {
        let Versioned {
            version,
            value: mut current,
        } = self.orders.get_order(order).await?;

        current.ensure_shippable()?;

        let request = shipment_request(&current, &self.pickup_location);

        debug!(
            number = %current.number(),
            payment_mode = ?request.payment_mode,
            weight_kg = %request.weight_kg,
            "handing order to carrier"
        );

        let created = time::timeout(self.carrier_timeout, self.carrier.create_shipment(&request))
            .await
            .map_err(|_elapsed| {
                warn!(number = %current.number(), "carrier did not answer in time");

                FulfillmentError::ProviderTimeout
            })??;

        let carrier_order_id = created.carrier_order_id.clone();
        let now = Timestamp::now();

        current.record_shipment(
            Shipment {
                carrier_order_id: created.carrier_order_id,
                shipment_id: created.shipment_id,
                tracking_code: created.tracking_code,
                created_at: now,
            },
            now,
        )?;

        match self.orders.replace_order(current, version).await {
            Ok(stored) => {
                let shipped = stored.into_inner();

                info!(number = %shipped.number(), %carrier_order_id, "order shipped");

                self.notifier.notify(messages::order_shipped(&shipped));

                Ok(shipped)
            }
            Err(StoreError::Conflict { .. }) => {
                let latest = self.orders.get_order(order).await?.into_inner();

                if latest.shipment().is_some() {
                    return Err(FulfillmentError::AlreadyShipped);
                }

                error!(
                    number = %latest.number(),
                    %carrier_order_id,
                    "carrier shipment created but the order changed concurrently; shipment not recorded"
                );

                Err(FulfillmentError::Conflict)
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[automock]
#[async_trait]
pub trait FulfillmentService: Send + Sync {
    /// Move an order along its lifecycle. `Shipped` is only reachable through
    /// [`FulfillmentService::ship`].
    async fn transition(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, FulfillmentError>;

    /// Hand a ready, fully paid order to the carrier and record the shipment.
    async fn ship(&self, order: OrderUuid) -> Result<Order, FulfillmentError>;
}
