//! Pricing
//!
//! Unit prices come from a product's tier table. The tier chosen is the one with the
//! largest `min_qty` whose band contains the requested quantity. When several
//! qualifying tiers share that `min_qty` (overlapping source data), the tier that
//! appears **last** in table order wins. Malformed tiers are skipped, and when no
//! tier qualifies the product's base price is used, so a line is always priceable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{PriceTier, Product};

/// Where a resolved unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// The tier at this index in the product's table.
    Tier(usize),

    /// The product's flat base price.
    BasePrice,
}

/// A resolved unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    /// Price per unit; never negative.
    pub unit_price: Decimal,

    /// Provenance of the price.
    pub source: PriceSource,
}

impl ResolvedPrice {
    /// Whether the base price had to be used.
    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::BasePrice
    }
}

/// Resolve the unit price of `quantity` units of `product`.
pub fn resolve_unit_price(product: &Product, quantity: u32) -> ResolvedPrice {
    resolve_tier_price(&product.tiers, product.base_price, quantity)
}

/// Resolve a unit price from a tier table with `base_price` as the fallback.
///
/// A negative base price is clamped to zero.
pub fn resolve_tier_price(tiers: &[PriceTier], base_price: Decimal, quantity: u32) -> ResolvedPrice {
    let selected = tiers
        .iter()
        .enumerate()
        .filter(|(_, tier)| tier.is_well_formed() && tier.contains(quantity))
        .fold(None::<(usize, &PriceTier)>, |best, (index, tier)| match best {
            Some((_, current)) if current.min_qty > tier.min_qty => best,
            _ => Some((index, tier)),
        });

    match selected {
        Some((index, tier)) => ResolvedPrice {
            unit_price: tier.unit_price,
            source: PriceSource::Tier(index),
        },
        None => ResolvedPrice {
            unit_price: base_price.max(Decimal::ZERO),
            source: PriceSource::BasePrice,
        },
    }
}
