//! Weights

use crate::{customization::Customization, products::Product};

/// Per-unit weight assumed when neither the customization nor the product says otherwise.
pub const DEFAULT_UNIT_WEIGHT_GRAMS: u64 = 500;

/// Where a resolved unit weight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSource {
    /// A product weight option matched the line's customization.
    Option,

    /// The product's declared unit weight.
    Product,

    /// [`DEFAULT_UNIT_WEIGHT_GRAMS`].
    Default,
}

/// A resolved line weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWeight {
    /// Grams per unit.
    pub unit_grams: u64,

    /// Grams for the whole line.
    pub line_grams: u64,

    /// Provenance of the unit weight.
    pub source: WeightSource,
}

/// Resolve the per-unit weight of a product as customized.
///
/// The first weight option whose key matches a customization key (ignoring ASCII
/// case) and whose value matches exactly wins.
pub fn resolve_unit_weight(product: &Product, customization: &Customization) -> (u64, WeightSource) {
    let matched = product.weight_options.iter().find(|option| {
        customization.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case(option.option.trim()) && value == option.value.trim()
        })
    });

    if let Some(option) = matched {
        return (option.grams_per_unit, WeightSource::Option);
    }

    match product.unit_weight_grams {
        Some(grams) => (grams, WeightSource::Product),
        None => (DEFAULT_UNIT_WEIGHT_GRAMS, WeightSource::Default),
    }
}

/// Resolve the shipping weight of `quantity` units of a customized product.
pub fn resolve_line_weight(
    product: &Product,
    customization: &Customization,
    quantity: u32,
) -> ResolvedWeight {
    let (unit_grams, source) = resolve_unit_weight(product, customization);

    ResolvedWeight {
        unit_grams,
        line_grams: unit_grams.saturating_mul(u64::from(quantity)),
        source,
    }
}
