//! Order lines
//!
//! Lines are priced once at checkout and frozen; later catalog changes never reach
//! an existing order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    carts::{CartLine, FileRef},
    customization::Customization,
    pricing::{PriceSource, ResolvedPrice, resolve_unit_price},
    products::{Product, ProductUuid},
    totals::TotalsError,
    weights::{ResolvedWeight, resolve_line_weight},
};

/// A line requested at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRequest {
    pub product: ProductUuid,
    pub quantity: u32,
    pub customization: Customization,
    pub files: Vec<FileRef>,
}

impl From<&CartLine> for LineRequest {
    fn from(line: &CartLine) -> Self {
        Self {
            product: line.product,
            quantity: line.quantity,
            customization: line.customization.clone(),
            files: line.files.clone(),
        }
    }
}

/// Frozen order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductUuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
    pub unit_weight_grams: u64,
    pub customization: Customization,
    pub files: Vec<FileRef>,
}

/// An order line together with how its price and weight were resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub line: OrderLine,
    pub price_source: PriceSource,
    pub weight: ResolvedWeight,
}

/// Price and weigh a requested line against its product.
///
/// A tier price whose line total cannot be represented falls back to the base
/// price for this line.
///
/// # Errors
///
/// Returns [`TotalsError::Overflow`] if even the base-price total cannot be
/// represented.
pub fn price_line(product: &Product, request: LineRequest) -> Result<PricedLine, TotalsError> {
    let quantity = Decimal::from(request.quantity);
    let weight = resolve_line_weight(product, &request.customization, request.quantity);

    let resolved = resolve_unit_price(product, request.quantity);

    let (price, line_total) = match resolved.unit_price.checked_mul(quantity) {
        Some(total) => (resolved, total),
        None => {
            let base = ResolvedPrice {
                unit_price: product.base_price.max(Decimal::ZERO),
                source: PriceSource::BasePrice,
            };

            let total = base
                .unit_price
                .checked_mul(quantity)
                .ok_or(TotalsError::Overflow)?;

            (base, total)
        }
    };

    Ok(PricedLine {
        line: OrderLine {
            product: request.product,
            name: product.name.clone(),
            unit_price: price.unit_price,
            quantity: request.quantity,
            line_total,
            unit_weight_grams: weight.unit_grams,
            customization: request.customization,
            files: request.files,
        },
        price_source: price.source,
        weight,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{products::PriceTier, weights::WeightSource};

    use super::*;

    #[test]
    fn freezes_tier_price_and_weight() -> TestResult {
        let product = Product::new("Kraft pouch", dec!(45))
            .with_tiers([PriceTier::from_qty(6000, dec!(3.80))])
            .with_weight_option("Capacity", "50 Gram", 4);

        let priced = price_line(
            &product,
            LineRequest {
                product: product.uuid,
                quantity: 7000,
                customization: Customization::from_pairs([("Capacity", "50 Gram")]),
                files: vec![FileRef::new("art.pdf")],
            },
        )?;

        assert_eq!(priced.line.unit_price, dec!(3.80));
        assert_eq!(priced.line.line_total, dec!(26600));
        assert_eq!(priced.line.name, "Kraft pouch");
        assert_eq!(priced.weight.line_grams, 28_000);
        assert_eq!(priced.weight.source, WeightSource::Option);
        assert_eq!(priced.price_source, PriceSource::Tier(0));

        Ok(())
    }

    #[test]
    fn unrepresentable_tier_total_falls_back_to_base_price() -> TestResult {
        let product = Product::new("Gift box", dec!(100))
            .with_tiers([PriceTier::from_qty(2, Decimal::MAX)]);

        let priced = price_line(
            &product,
            LineRequest {
                product: product.uuid,
                quantity: 10,
                customization: Customization::new(),
                files: Vec::new(),
            },
        )?;

        assert_eq!(priced.price_source, PriceSource::BasePrice);
        assert_eq!(priced.line.unit_price, dec!(100));
        assert_eq!(priced.line.line_total, dec!(1000));

        Ok(())
    }

    #[test]
    fn unrepresentable_base_total_is_an_overflow() {
        let product = Product::new("Gift box", Decimal::MAX);

        let result = price_line(
            &product,
            LineRequest {
                product: product.uuid,
                quantity: 10,
                customization: Customization::new(),
                files: Vec::new(),
            },
        );

        assert_eq!(result.map(|priced| priced.line), Err(TotalsError::Overflow));
    }
}
