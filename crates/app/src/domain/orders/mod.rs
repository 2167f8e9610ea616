//! Orders

use presswork::{
    carts::Cart,
    orders::{LineRequest, PaymentMethod, ShippingAddress},
};
use rust_decimal::Decimal;

use crate::domain::payments::ProviderPayment;

pub mod errors;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;

/// Checkout input.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub lines: Vec<LineRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,

    /// Amount the customer paid up front, as declared by the client.
    pub advance_paid: Decimal,

    /// Provider references for the advance, verified when present.
    pub advance_payment: Option<ProviderPayment>,

    /// Revision of the customer's cart these lines were taken from. The cart is
    /// deleted together with the order insert, and checkout fails if it changed.
    pub cart_revision: Option<u64>,
}

impl CheckoutRequest {
    /// Check out every line of `cart`, clearing it on success unless it changes
    /// in the meantime.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        advance_paid: Decimal,
    ) -> Self {
        Self {
            lines: cart.lines().iter().map(LineRequest::from).collect(),
            shipping_address,
            payment_method,
            advance_paid,
            advance_payment: None,
            cart_revision: Some(cart.revision()),
        }
    }

    /// Attach provider references for the advance.
    #[must_use]
    pub fn with_advance_payment(mut self, payment: ProviderPayment) -> Self {
        self.advance_payment = Some(payment);
        self
    }
}
