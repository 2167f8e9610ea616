//! Document store
//!
//! Carts and orders are stored as whole documents. Every write bumps a document
//! version, and replacements only succeed when the caller still holds the latest
//! version, so read-modify-write cycles never overwrite a concurrent change.

use async_trait::async_trait;
use mockall::automock;
use presswork::{
    carts::Cart,
    customers::CustomerUuid,
    orders::{Order, OrderNumber, OrderUuid},
    products::{Product, ProductUuid},
};

pub mod errors;
mod memory;

pub use errors::StoreError;
pub use memory::MemoryStore;

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

impl<T> Versioned<T> {
    /// Wrap a freshly inserted document.
    pub fn initial(value: T) -> Self {
        Self { version: 1, value }
    }

    /// Discard the version.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// The cart revision a checkout was priced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartClaim {
    pub owner: CustomerUuid,
    pub revision: u64,
}

#[automock]
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Retrieve a product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, StoreError>;

    /// Insert or replace a product.
    async fn put_product(&self, product: Product) -> Result<(), StoreError>;
}

#[automock]
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// Retrieve the cart owned by `owner`, if any.
    async fn find_cart(&self, owner: CustomerUuid) -> Result<Option<Versioned<Cart>>, StoreError>;

    /// Insert a new cart. Fails with `AlreadyExists` if the owner already has one.
    async fn insert_cart(&self, cart: Cart) -> Result<Versioned<Cart>, StoreError>;

    /// Replace a cart if it is still at `expected_version`.
    async fn replace_cart(
        &self,
        cart: Cart,
        expected_version: u64,
    ) -> Result<Versioned<Cart>, StoreError>;

    /// Delete the cart owned by `owner`. Returns whether a cart was deleted.
    async fn delete_cart(&self, owner: CustomerUuid) -> Result<bool, StoreError>;
}

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Insert a new order and, in the same step, delete the claimed cart.
    ///
    /// A missing cart is not an error. Nothing is written when the order uuid or
    /// order number is taken (`AlreadyExists`) or when the cart has moved past the
    /// claimed revision (`Conflict`).
    async fn insert_order(
        &self,
        order: Order,
        cart: Option<CartClaim>,
    ) -> Result<Versioned<Order>, StoreError>;

    /// Retrieve an order.
    async fn get_order(&self, order: OrderUuid) -> Result<Versioned<Order>, StoreError>;

    /// Whether an order number is already in use.
    async fn order_number_exists(&self, number: &OrderNumber) -> Result<bool, StoreError>;

    /// Whether any order has already applied `provider_payment_id`.
    async fn payment_recorded(&self, provider_payment_id: &str) -> Result<bool, StoreError>;

    /// Replace an order if it is still at `expected_version`.
    async fn replace_order(
        &self,
        order: Order,
        expected_version: u64,
    ) -> Result<Versioned<Order>, StoreError>;
}
