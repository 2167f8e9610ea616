//! Pricing Config

use std::num::NonZeroU64;

use clap::Args;
use presswork::totals::{PricingPolicy, ShippingTariff, TaxRate, TotalsError};
use rust_decimal::Decimal;

/// Shipping tariff and tax settings applied at checkout.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Shipping fee charged regardless of weight
    #[arg(long, env = "PRESSWORK_SHIPPING_MINIMUM_FEE", default_value = "50")]
    pub shipping_minimum_fee: Decimal,

    /// Size of one shipping billing step in grams
    #[arg(long, env = "PRESSWORK_SHIPPING_WEIGHT_UNIT_GRAMS", default_value = "500")]
    pub shipping_weight_unit_grams: NonZeroU64,

    /// Fee per started shipping step
    #[arg(long, env = "PRESSWORK_SHIPPING_UNIT_FEE", default_value = "28")]
    pub shipping_unit_fee: Decimal,

    /// Tax rate in percent points
    #[arg(long, env = "PRESSWORK_TAX_RATE_PERCENT", default_value = "18")]
    pub tax_rate_percent: Decimal,
}

impl PricingConfig {
    /// The pricing policy these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error when the tax rate is negative.
    pub fn policy(&self) -> Result<PricingPolicy, TotalsError> {
        Ok(PricingPolicy {
            shipping: ShippingTariff {
                minimum_fee: self.shipping_minimum_fee,
                weight_unit_grams: self.shipping_weight_unit_grams,
                unit_fee: self.shipping_unit_fee,
            },
            tax: TaxRate::from_percent_points(self.tax_rate_percent)?,
        })
    }
}
