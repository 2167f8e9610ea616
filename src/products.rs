//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// A quantity band mapped to a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Smallest quantity this tier applies to.
    pub min_qty: u32,

    /// Largest quantity this tier applies to; open-ended when `None`.
    #[serde(default)]
    pub max_qty: Option<u32>,

    /// Price charged per unit within the band.
    pub unit_price: Decimal,
}

impl PriceTier {
    /// Create an open-ended tier.
    pub fn from_qty(min_qty: u32, unit_price: Decimal) -> Self {
        Self {
            min_qty,
            max_qty: None,
            unit_price,
        }
    }

    /// Create a bounded tier.
    pub fn between(min_qty: u32, max_qty: u32, unit_price: Decimal) -> Self {
        Self {
            min_qty,
            max_qty: Some(max_qty),
            unit_price,
        }
    }

    /// Whether `quantity` falls within this tier's band.
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_qty && self.max_qty.is_none_or(|max| quantity <= max)
    }

    /// Whether the tier can be used at all. Source data is not trusted to be well-formed.
    pub fn is_well_formed(&self) -> bool {
        !self.unit_price.is_sign_negative() && self.max_qty.is_none_or(|max| max >= self.min_qty)
    }
}

/// Per-unit shipping weight implied by a specific customization choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightOption {
    /// Customization key, e.g. `Capacity`.
    pub option: String,

    /// Customization value, e.g. `500 Gram`.
    pub value: String,

    /// Packed weight of one unit with this choice.
    pub grams_per_unit: u64,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product UUID
    pub uuid: ProductUuid,

    /// Display name, frozen onto order lines at checkout.
    pub name: String,

    /// Flat price used when no tier applies.
    pub base_price: Decimal,

    /// Quantity tiers, in table order.
    #[serde(default)]
    pub tiers: Vec<PriceTier>,

    /// Default packed weight of one unit.
    #[serde(default)]
    pub unit_weight_grams: Option<u64>,

    /// Customization-specific unit weights.
    #[serde(default)]
    pub weight_options: Vec<WeightOption>,
}

impl Product {
    /// Create a product with a flat price and no tiers.
    pub fn new(name: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            uuid: ProductUuid::new(),
            name: name.into(),
            base_price,
            tiers: Vec::new(),
            unit_weight_grams: None,
            weight_options: Vec::new(),
        }
    }

    /// Replace the tier table.
    #[must_use]
    pub fn with_tiers(mut self, tiers: impl Into<Vec<PriceTier>>) -> Self {
        self.tiers = tiers.into();
        self
    }

    /// Set the default unit weight.
    #[must_use]
    pub fn with_unit_weight(mut self, grams: u64) -> Self {
        self.unit_weight_grams = Some(grams);
        self
    }

    /// Add a customization-specific unit weight.
    #[must_use]
    pub fn with_weight_option(
        mut self,
        option: impl Into<String>,
        value: impl Into<String>,
        grams_per_unit: u64,
    ) -> Self {
        self.weight_options.push(WeightOption {
            option: option.into(),
            value: value.into(),
            grams_per_unit,
        });
        self
    }
}
