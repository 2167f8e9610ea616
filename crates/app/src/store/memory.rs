//! In-process document store.

use std::sync::Arc;

use async_trait::async_trait;
use presswork::{
    carts::Cart,
    customers::CustomerUuid,
    orders::{Order, OrderNumber, OrderUuid},
    products::{Product, ProductUuid},
};
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::Mutex;

use crate::store::{
    CartClaim, CartsRepository, OrdersRepository, ProductsRepository, StoreError, Versioned,
};

#[derive(Debug, Default)]
struct Documents {
    products: FxHashMap<ProductUuid, Product>,
    carts: FxHashMap<CustomerUuid, Versioned<Cart>>,
    orders: FxHashMap<OrderUuid, Versioned<Order>>,
    order_numbers: FxHashSet<OrderNumber>,
}

/// Store keeping every document in memory behind one lock.
///
/// The lock is only held for the duration of a single store call.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<Documents>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(slot: &mut Versioned<T>, value: T, expected_version: u64) -> Result<Versioned<T>, StoreError>
where
    T: Clone,
{
    if slot.version != expected_version {
        return Err(StoreError::Conflict {
            expected: expected_version,
            found: slot.version,
        });
    }

    slot.version += 1;
    slot.value = value;

    Ok(slot.clone())
}

#[async_trait]
impl ProductsRepository for MemoryStore {
    async fn get_product(&self, product: ProductUuid) -> Result<Product, StoreError> {
        let documents = self.documents.lock().await;

        documents
            .products
            .get(&product)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn put_product(&self, product: Product) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().await;

        documents.products.insert(product.uuid, product);

        Ok(())
    }
}

#[async_trait]
impl CartsRepository for MemoryStore {
    async fn find_cart(&self, owner: CustomerUuid) -> Result<Option<Versioned<Cart>>, StoreError> {
        let documents = self.documents.lock().await;

        Ok(documents.carts.get(&owner).cloned())
    }

    async fn insert_cart(&self, cart: Cart) -> Result<Versioned<Cart>, StoreError> {
        let mut documents = self.documents.lock().await;

        if documents.carts.contains_key(&cart.owner) {
            return Err(StoreError::AlreadyExists);
        }

        let stored = Versioned::initial(cart);
        documents.carts.insert(stored.value.owner, stored.clone());

        Ok(stored)
    }

    async fn replace_cart(
        &self,
        cart: Cart,
        expected_version: u64,
    ) -> Result<Versioned<Cart>, StoreError> {
        let mut documents = self.documents.lock().await;

        let slot = documents
            .carts
            .get_mut(&cart.owner)
            .filter(|stored| stored.value.uuid == cart.uuid)
            .ok_or(StoreError::NotFound)?;

        replace(slot, cart, expected_version)
    }

    async fn delete_cart(&self, owner: CustomerUuid) -> Result<bool, StoreError> {
        let mut documents = self.documents.lock().await;

        Ok(documents.carts.remove(&owner).is_some())
    }
}

#[async_trait]
impl OrdersRepository for MemoryStore {
    async fn insert_order(
        &self,
        order: Order,
        cart: Option<CartClaim>,
    ) -> Result<Versioned<Order>, StoreError> {
        let mut documents = self.documents.lock().await;

        if documents.orders.contains_key(&order.uuid())
            || documents.order_numbers.contains(order.number())
        {
            return Err(StoreError::AlreadyExists);
        }

        if let Some(claim) = cart {
            let current = documents
                .carts
                .get(&claim.owner)
                .map(|stored| stored.value.revision());

            if let Some(found) = current.filter(|found| *found != claim.revision) {
                return Err(StoreError::Conflict {
                    expected: claim.revision,
                    found,
                });
            }

            documents.carts.remove(&claim.owner);
        }

        let stored = Versioned::initial(order);

        documents.order_numbers.insert(stored.value.number().clone());
        documents.orders.insert(stored.value.uuid(), stored.clone());

        Ok(stored)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Versioned<Order>, StoreError> {
        let documents = self.documents.lock().await;

        documents
            .orders
            .get(&order)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn order_number_exists(&self, number: &OrderNumber) -> Result<bool, StoreError> {
        let documents = self.documents.lock().await;

        Ok(documents.order_numbers.contains(number))
    }

    async fn payment_recorded(&self, provider_payment_id: &str) -> Result<bool, StoreError> {
        let documents = self.documents.lock().await;

        Ok(documents
            .orders
            .values()
            .any(|stored| stored.value.has_payment(provider_payment_id)))
    }

    async fn replace_order(
        &self,
        order: Order,
        expected_version: u64,
    ) -> Result<Versioned<Order>, StoreError> {
        let mut documents = self.documents.lock().await;

        let slot = documents
            .orders
            .get_mut(&order.uuid())
            .ok_or(StoreError::NotFound)?;

        replace(slot, order, expected_version)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use presswork::{
        carts::NewCartLine,
        customization::Customization,
        orders::{NewOrder, OrderError, OrderLine, PaymentMethod},
        totals::PricingPolicy,
    };
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::test::helpers::address;

    use super::*;

    fn line(product: ProductUuid, quantity: u32) -> NewCartLine {
        NewCartLine {
            product,
            quantity,
            customization: Customization::new(),
            files: Vec::new(),
        }
    }

    fn placed(customer: CustomerUuid) -> Result<Order, OrderError> {
        let now = Timestamp::now();

        Order::place(
            NewOrder {
                number: OrderNumber::generate(now, &mut rand::thread_rng()),
                customer,
                lines: vec![OrderLine {
                    product: ProductUuid::new(),
                    name: "Gift box".to_string(),
                    unit_price: Decimal::ONE_HUNDRED,
                    quantity: 1,
                    line_total: Decimal::ONE_HUNDRED,
                    unit_weight_grams: 120,
                    customization: Customization::new(),
                    files: Vec::new(),
                }],
                total_weight_grams: 120,
                shipping_address: address(),
                payment_method: PaymentMethod::Online,
                advance_paid: Decimal::ZERO,
                advance_reference: Some("pay_adv".to_string()),
            },
            &PricingPolicy::default(),
            now,
        )
    }

    #[tokio::test]
    async fn stale_cart_replacement_conflicts() -> TestResult {
        let store = MemoryStore::new();
        let owner = CustomerUuid::new();
        let cart = Cart::new(owner, Timestamp::now());

        let stored = store.insert_cart(cart.clone()).await?;
        let updated = store.replace_cart(cart.clone(), stored.version).await?;

        assert_eq!(updated.version, 2);

        let result = store.replace_cart(cart, stored.version).await;

        assert_eq!(
            result,
            Err(StoreError::Conflict {
                expected: 1,
                found: 2
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn second_cart_for_owner_is_rejected() -> TestResult {
        let store = MemoryStore::new();
        let owner = CustomerUuid::new();

        store.insert_cart(Cart::new(owner, Timestamp::now())).await?;

        let result = store.insert_cart(Cart::new(owner, Timestamp::now())).await;

        assert_eq!(result, Err(StoreError::AlreadyExists));

        Ok(())
    }

    #[tokio::test]
    async fn deleting_missing_cart_reports_false() -> TestResult {
        let store = MemoryStore::new();

        assert!(!store.delete_cart(CustomerUuid::new()).await?);

        Ok(())
    }

    #[tokio::test]
    async fn order_insert_keeps_a_cart_that_moved_on() -> TestResult {
        let store = MemoryStore::new();
        let owner = CustomerUuid::new();
        let product = ProductUuid::new();
        let now = Timestamp::now();

        let mut cart = Cart::new(owner, now);
        cart.add_line(line(product, 10), now)?;
        let stored = store.insert_cart(cart.clone()).await?;

        let claim = CartClaim {
            owner,
            revision: cart.revision(),
        };

        cart.add_line(line(ProductUuid::new(), 1), now)?;
        store.replace_cart(cart, stored.version).await?;

        let order = placed(owner)?;
        let result = store.insert_order(order.clone(), Some(claim)).await;

        assert_eq!(
            result.map(Versioned::into_inner),
            Err(StoreError::Conflict {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(store.get_order(order.uuid()).await, Err(StoreError::NotFound));
        assert!(!store.order_number_exists(order.number()).await?);

        let kept = store.find_cart(owner).await?.ok_or("cart was deleted")?;
        assert_eq!(kept.value.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn order_insert_clears_the_claimed_cart() -> TestResult {
        let store = MemoryStore::new();
        let owner = CustomerUuid::new();
        let now = Timestamp::now();

        let mut cart = Cart::new(owner, now);
        cart.add_line(line(ProductUuid::new(), 10), now)?;
        store.insert_cart(cart.clone()).await?;

        let claim = CartClaim {
            owner,
            revision: cart.revision(),
        };

        store.insert_order(placed(owner)?, Some(claim)).await?;

        assert_eq!(store.find_cart(owner).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn recorded_payments_are_found_across_orders() -> TestResult {
        let store = MemoryStore::new();
        let order = placed(CustomerUuid::new())?;

        store.insert_order(order, None).await?;

        assert!(store.payment_recorded("pay_adv").await?);
        assert!(!store.payment_recorded("pay_other").await?);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let store = MemoryStore::new();

        let result = store.get_product(ProductUuid::new()).await;

        assert_eq!(result, Err(StoreError::NotFound));
    }
}
