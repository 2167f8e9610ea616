//! Totals
//!
//! Shipping is a stepped tariff with a floor:
//! `max(minimum_fee, ceil(weight / weight_unit) * unit_fee)`. Tax is a fixed
//! percentage of the subtotal rounded to a whole currency unit.

use std::num::NonZeroU64;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while computing order totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotalsError {
    /// Arithmetic left the representable decimal range.
    #[error("order totals overflowed")]
    Overflow,

    /// A tax rate below zero.
    #[error("tax rate cannot be negative: {0}%")]
    NegativeTaxRate(Decimal),
}

/// Weight-stepped shipping tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingTariff {
    /// Fee charged regardless of weight.
    pub minimum_fee: Decimal,

    /// Size of one billing step.
    pub weight_unit_grams: NonZeroU64,

    /// Fee per started step.
    pub unit_fee: Decimal,
}

impl Default for ShippingTariff {
    fn default() -> Self {
        Self {
            minimum_fee: Decimal::from(50),
            weight_unit_grams: NonZeroU64::MIN.saturating_add(499),
            unit_fee: Decimal::from(28),
        }
    }
}

impl ShippingTariff {
    /// Shipping cost for a consignment of `total_weight_grams`.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when the stepped fee cannot be represented.
    pub fn cost(&self, total_weight_grams: u64) -> Result<Decimal, TotalsError> {
        let steps = total_weight_grams.div_ceil(self.weight_unit_grams.get());

        let stepped = Decimal::from(steps)
            .checked_mul(self.unit_fee)
            .ok_or(TotalsError::Overflow)?;

        Ok(stepped.max(self.minimum_fee))
    }
}

/// Tax rate applied to the subtotal.
#[derive(Debug, Clone, Copy)]
pub struct TaxRate(Percentage);

impl TaxRate {
    /// Build a rate from percent points, e.g. `18` for 18%.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::NegativeTaxRate`] for rates below zero.
    pub fn from_percent_points(points: Decimal) -> Result<Self, TotalsError> {
        if points.is_sign_negative() && !points.is_zero() {
            return Err(TotalsError::NegativeTaxRate(points));
        }

        let fraction = points
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(TotalsError::Overflow)?;

        Ok(Self(Percentage::from(fraction)))
    }

    /// Tax owed on `subtotal`, rounded half away from zero to a whole unit.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when the product cannot be represented.
    pub fn tax_on(&self, subtotal: Decimal) -> Result<Decimal, TotalsError> {
        (self.0 * Decimal::ONE)
            .checked_mul(subtotal)
            .map(|tax| tax.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .ok_or(TotalsError::Overflow)
    }
}

impl From<Percentage> for TaxRate {
    fn from(rate: Percentage) -> Self {
        Self(rate)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(Percentage::from(Decimal::new(18, 2)))
    }
}

/// Pricing policy applied at checkout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingPolicy {
    pub shipping: ShippingTariff,
    pub tax: TaxRate,
}

/// The four figures frozen onto an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for a subtotal and consignment weight.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::Overflow`] when any figure cannot be represented.
    pub fn compute(
        policy: &PricingPolicy,
        subtotal: Decimal,
        total_weight_grams: u64,
    ) -> Result<Self, TotalsError> {
        let shipping_cost = policy.shipping.cost(total_weight_grams)?;
        let tax = policy.tax.tax_on(subtotal)?;

        let total = subtotal
            .checked_add(shipping_cost)
            .and_then(|sum| sum.checked_add(tax))
            .ok_or(TotalsError::Overflow)?;

        Ok(Self {
            subtotal,
            shipping_cost,
            tax,
            total,
        })
    }

    /// Whether `total == subtotal + shipping_cost + tax`.
    pub fn is_consistent(&self) -> bool {
        self.subtotal + self.shipping_cost + self.tax == self.total
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn light_parcels_pay_the_minimum_fee() -> TestResult {
        let tariff = ShippingTariff::default();

        assert_eq!(tariff.cost(0)?, dec!(50));
        assert_eq!(tariff.cost(500)?, dec!(50));

        Ok(())
    }

    #[test]
    fn every_started_unit_is_charged() -> TestResult {
        let tariff = ShippingTariff::default();

        assert_eq!(tariff.cost(1001)?, dec!(84));
        assert_eq!(tariff.cost(1500)?, dec!(84));
        assert_eq!(tariff.cost(1501)?, dec!(112));

        Ok(())
    }

    #[test]
    fn tax_is_rounded_to_whole_units() -> TestResult {
        let rate = TaxRate::from_percent_points(dec!(18))?;

        assert_eq!(rate.tax_on(dec!(1000))?, dec!(180));
        assert_eq!(rate.tax_on(dec!(102.50))?, dec!(18));
        assert_eq!(rate.tax_on(dec!(2.5))?, dec!(0));
        assert_eq!(rate.tax_on(dec!(2.78))?, dec!(1));

        Ok(())
    }

    #[test]
    fn default_rate_is_eighteen_percent() -> TestResult {
        assert_eq!(TaxRate::default().tax_on(dec!(1000))?, dec!(180));

        Ok(())
    }

    #[test]
    fn negative_tax_rates_are_rejected() {
        assert_eq!(
            TaxRate::from_percent_points(dec!(-5)).map(|_rate| ()),
            Err(TotalsError::NegativeTaxRate(dec!(-5)))
        );
        assert!(TaxRate::from_percent_points(Decimal::ZERO).is_ok());
    }

    #[test]
    fn totals_add_up() -> TestResult {
        let totals = OrderTotals::compute(&PricingPolicy::default(), dec!(1000), 1200)?;

        assert_eq!(totals.shipping_cost, dec!(84));
        assert_eq!(totals.tax, dec!(180));
        assert_eq!(totals.total, dec!(1264));
        assert!(totals.is_consistent());

        Ok(())
    }
}
