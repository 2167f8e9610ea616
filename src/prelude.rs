//! Presswork prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartError, CartLine, CartLineUuid, CartUuid, FileRef, NewCartLine},
    catalog::{Catalog, CatalogError},
    customers::CustomerUuid,
    customization::Customization,
    orders::{
        LedgerError, LifecycleError, LineRequest, NewOrder, Order, OrderError, OrderLine, OrderNumber,
        OrderStatus, OrderUuid, PaymentLedger, PaymentMethod, PaymentStatus, PricedLine, Shipment,
        ShippingAddress, StatusEntry, StatusHistory, price_line,
    },
    pricing::{PriceSource, ResolvedPrice, resolve_tier_price, resolve_unit_price},
    products::{PriceTier, Product, ProductUuid, WeightOption},
    signature::{SignatureError, sign_payment, verify_payment_signature},
    totals::{OrderTotals, PricingPolicy, ShippingTariff, TaxRate, TotalsError},
    uuids::TypedUuid,
    weights::{DEFAULT_UNIT_WEIGHT_GRAMS, ResolvedWeight, WeightSource, resolve_line_weight, resolve_unit_weight},
};
