//! Test Helpers

use presswork::{
    carts::{FileRef, NewCartLine},
    customization::Customization,
    orders::{LineRequest, PaymentMethod, ShippingAddress},
    products::{PriceTier, Product, ProductUuid},
    signature::sign_payment,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    config::Secret,
    domain::{
        orders::CheckoutRequest,
        payments::{PaymentVerifier, ProviderPayment},
    },
};

pub(crate) const PAYMENT_SECRET: &str = "payments-secret";

pub(crate) fn verifier() -> PaymentVerifier {
    PaymentVerifier::new(Secret::new(PAYMENT_SECRET))
}

/// Provider references signed the way the payment provider signs them.
pub(crate) fn signed_payment(provider_order_id: &str, provider_payment_id: &str) -> ProviderPayment {
    ProviderPayment {
        provider_order_id: provider_order_id.to_string(),
        provider_payment_id: provider_payment_id.to_string(),
        signature: sign_payment(
            PAYMENT_SECRET.as_bytes(),
            provider_order_id,
            provider_payment_id,
        )
        .unwrap_or_default(),
    }
}

/// Tiered stand-up pouch with capacity-specific weights.
pub(crate) fn pouch() -> Product {
    Product::new("Kraft stand-up pouch", dec!(45))
        .with_tiers([
            PriceTier::from_qty(6000, dec!(3.80)),
            PriceTier::from_qty(10000, dec!(3.60)),
        ])
        .with_weight_option("Capacity", "50 Gram", 4)
        .with_weight_option("Capacity", "100 Gram", 6)
}

/// Flat-priced box: 100 each, 120 g each.
pub(crate) fn gift_box() -> Product {
    Product::new("Rigid gift box", dec!(100)).with_unit_weight(120)
}

pub(crate) fn pouch_line(product: ProductUuid, capacity: &str, quantity: u32) -> NewCartLine {
    NewCartLine {
        product,
        quantity,
        customization: Customization::from_pairs([("Capacity", capacity)]),
        files: vec![FileRef::new("artwork.pdf")],
    }
}

pub(crate) fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98450 00000".to_string(),
        line1: "12 Residency Road".to_string(),
        line2: None,
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560025".to_string(),
        country: "India".to_string(),
    }
}

pub(crate) fn gift_box_request(product: ProductUuid, quantity: u32, advance: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        lines: vec![LineRequest {
            product,
            quantity,
            customization: Customization::new(),
            files: Vec::new(),
        }],
        shipping_address: address(),
        payment_method: PaymentMethod::Online,
        advance_paid: advance,
        advance_payment: None,
        cart_revision: None,
    }
}
