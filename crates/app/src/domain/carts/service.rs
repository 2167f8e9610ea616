//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use presswork::{
    carts::{Cart, CartError, CartLineUuid, NewCartLine},
    customers::CustomerUuid,
};
use tracing::{debug, info, warn};

use crate::{
    domain::{MAX_WRITE_ATTEMPTS, carts::errors::CartsServiceError},
    store::{CartsRepository, ProductsRepository, StoreError, Versioned},
};

#[derive(Clone)]
pub struct StoreCartsService {
    products: Arc<dyn ProductsRepository>,
    carts: Arc<dyn CartsRepository>,
}

impl StoreCartsService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductsRepository>, carts: Arc<dyn CartsRepository>) -> Self {
        Self { products, carts }
    }

    /// Apply `change` to the customer's cart and write it back, re-reading and
    /// re-applying when another writer got there first.
    async fn mutate<F>(
        &self,
        customer: CustomerUuid,
        create_if_missing: bool,
        mut change: F,
    ) -> Result<Cart, CartsServiceError>
    where
        F: FnMut(&mut Cart, Timestamp) -> Result<(), CartError> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let now = Timestamp::now();

            let written = match self.carts.find_cart(customer).await? {
                Some(Versioned {
                    version,
                    value: mut cart,
                }) => {
                    change(&mut cart, now)?;

                    self.carts.replace_cart(cart, version).await
                }
                None if create_if_missing => {
                    let mut cart = Cart::new(customer, now);

                    change(&mut cart, now)?;

                    self.carts.insert_cart(cart).await
                }
                None => return Err(CartsServiceError::NotFound),
            };

            match written {
                Ok(stored) => return Ok(stored.into_inner()),
                Err(StoreError::Conflict { .. } | StoreError::AlreadyExists) => {
                    debug!(%customer, attempt, "cart changed concurrently; retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        warn!(%customer, "giving up on cart change after repeated conflicts");

        Err(CartsServiceError::Conflict)
    }
}

impl std::fmt::Debug for StoreCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCartsService").finish_non_exhaustive()
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    async fn get_cart(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError> {
        self.carts
            .find_cart(customer)
            .await?
            .map(Versioned::into_inner)
            .ok_or(CartsServiceError::NotFound)
    }

    async fn add_line(
        &self,
        customer: CustomerUuid,
        line: NewCartLine,
    ) -> Result<Cart, CartsServiceError> {
        if line.quantity == 0 {
            return Err(CartsServiceError::Validation(CartError::ZeroQuantity));
        }

        match self.products.get_product(line.product).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => return Err(CartsServiceError::ProductNotFound(line.product)),
            Err(error) => return Err(CartsServiceError::Store(error)),
        }

        let product = line.product;
        let quantity = line.quantity;

        let cart = self
            .mutate(customer, true, |cart, now| {
                cart.add_line(line.clone(), now).map(|_line| ())
            })
            .await?;

        info!(%customer, %product, quantity, lines = cart.len(), "cart line added");

        Ok(cart)
    }

    async fn update_line(
        &self,
        customer: CustomerUuid,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError> {
        let cart = self
            .mutate(customer, false, |cart, now| {
                cart.update_quantity(line, quantity, now)
            })
            .await?;

        info!(%customer, %line, quantity, "cart line updated");

        Ok(cart)
    }

    async fn remove_line(
        &self,
        customer: CustomerUuid,
        line: CartLineUuid,
    ) -> Result<Cart, CartsServiceError> {
        let cart = self
            .mutate(customer, false, |cart, now| {
                cart.remove_line(line, now).map(|_removed| ())
            })
            .await?;

        info!(%customer, %line, "cart line removed");

        Ok(cart)
    }

    async fn clear_cart(&self, customer: CustomerUuid) -> Result<(), CartsServiceError> {
        if !self.carts.delete_cart(customer).await? {
            return Err(CartsServiceError::NotFound);
        }

        info!(%customer, "cart cleared");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the customer's cart.
    async fn get_cart(&self, customer: CustomerUuid) -> Result<Cart, CartsServiceError>;

    /// Add a line, merging it into an existing line with the same product and
    /// customization. Creates the cart on first use.
    async fn add_line(
        &self,
        customer: CustomerUuid,
        line: NewCartLine,
    ) -> Result<Cart, CartsServiceError>;

    /// Set the quantity of a line.
    async fn update_line(
        &self,
        customer: CustomerUuid,
        line: CartLineUuid,
        quantity: u32,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line.
    async fn remove_line(
        &self,
        customer: CustomerUuid,
        line: CartLineUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Delete the customer's cart.
    async fn clear_cart(&self, customer: CustomerUuid) -> Result<(), CartsServiceError>;
}
