//! Catalog fixtures
//!
//! Products can be loaded from YAML, which the CLI and tests use to price lines
//! without a running store:
//!
//! ```yaml
//! tax_rate: "18%"
//! products:
//!   kraft-pouch:
//!     name: Kraft stand-up pouch
//!     price: "45 INR"
//!     unit_weight_grams: 6
//!     tiers:
//!       - { min_qty: 6000, price: "3.80 INR" }
//!       - { min_qty: 10000, price: "3.60 INR" }
//!     weight_options:
//!       - { option: Capacity, value: "50 Gram", grams_per_unit: 4 }
//! ```

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    products::{PriceTier, Product},
    totals::TaxRate,
};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Catalog has no products
    #[error("catalog has no products; currency unknown")]
    NoCurrency,
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    tax_rate: Option<String>,
    products: FxHashMap<String, ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    price: String,
    #[serde(default)]
    unit_weight_grams: Option<u64>,
    #[serde(default)]
    tiers: Vec<TierFixture>,
    #[serde(default)]
    weight_options: Vec<WeightOptionFixture>,
}

#[derive(Debug, Deserialize)]
struct TierFixture {
    min_qty: u32,
    #[serde(default)]
    max_qty: Option<u32>,
    price: String,
}

#[derive(Debug, Deserialize)]
struct WeightOptionFixture {
    option: String,
    value: String,
    grams_per_unit: u64,
}

/// Products keyed by their fixture key, all priced in one currency.
#[derive(Debug)]
pub struct Catalog {
    currency: &'static Currency,
    tax_rate: Option<TaxRate>,
    products: FxHashMap<String, Product>,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if prices are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, a price is malformed, or prices use
    /// more than one currency.
    pub fn from_yaml_str(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let tax_rate = fixture
            .tax_rate
            .as_deref()
            .map(parse_percentage)
            .transpose()?
            .map(TaxRate::from);

        let mut currency: Option<&'static Currency> = None;
        let mut products = FxHashMap::default();

        for (key, product_fixture) in fixture.products {
            let (base_price, product_currency) = parse_price(&product_fixture.price)?;
            check_currency(&mut currency, product_currency)?;

            let mut tiers = Vec::with_capacity(product_fixture.tiers.len());

            for tier in &product_fixture.tiers {
                let (unit_price, tier_currency) = parse_price(&tier.price)?;
                check_currency(&mut currency, tier_currency)?;

                tiers.push(PriceTier {
                    min_qty: tier.min_qty,
                    max_qty: tier.max_qty,
                    unit_price,
                });
            }

            let mut product = Product::new(product_fixture.name, base_price).with_tiers(tiers);

            if let Some(grams) = product_fixture.unit_weight_grams {
                product = product.with_unit_weight(grams);
            }

            for option in product_fixture.weight_options {
                product = product.with_weight_option(option.option, option.value, option.grams_per_unit);
            }

            products.insert(key, product);
        }

        let currency = currency.ok_or(CatalogError::NoCurrency)?;

        Ok(Self {
            currency,
            tax_rate,
            products,
        })
    }

    /// Currency every price is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Tax rate declared by the catalog, if any.
    pub fn tax_rate(&self) -> Option<TaxRate> {
        self.tax_rate
    }

    /// Look up a product by fixture key.
    pub fn get(&self, key: &str) -> Option<&Product> {
        self.products.get(key)
    }

    /// Iterate over fixture keys and products.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Product)> {
        self.products.iter().map(|(key, product)| (key.as_str(), product))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Format an amount in the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPrice`] if the amount does not fit in minor units.
    pub fn format_amount(&self, amount: Decimal) -> Result<String, CatalogError> {
        let minor_units = to_minor_units(amount).ok_or_else(|| CatalogError::InvalidPrice(amount.to_string()))?;

        Ok(Money::from_minor(minor_units, self.currency).to_string())
    }
}

fn check_currency(
    current: &mut Option<&'static Currency>,
    found: &'static Currency,
) -> Result<(), CatalogError> {
    match current {
        Some(existing) if *existing != found => Err(CatalogError::CurrencyMismatch(
            existing.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        )),
        Some(_) => Ok(()),
        None => {
            *current = Some(found);

            Ok(())
        }
    }
}

fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
}

/// Parse a price string (e.g. `"3.80 INR"`) into an amount and currency.
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY`, the amount is not a
/// decimal, or the currency code is not an ISO currency.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = Currency::find(code).ok_or_else(|| CatalogError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}

/// Parse a percentage string (`"18%"` or `"0.18"`).
///
/// # Errors
///
/// Returns an error if the value is not a decimal number or is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, CatalogError> {
    let invalid = || CatalogError::InvalidPercentage(s.to_string());
    let trimmed = s.trim();

    let fraction = if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?
    } else {
        trimmed.parse::<Decimal>().map_err(|_err| invalid())?
    };

    if fraction.is_sign_negative() && !fraction.is_zero() {
        return Err(invalid());
    }

    Ok(Percentage::from(fraction))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{customization::Customization, pricing::resolve_unit_price, weights::resolve_line_weight};

    use super::*;

    const CATALOG: &str = r#"
tax_rate: "18%"
products:
  kraft-pouch:
    name: Kraft stand-up pouch
    price: "45 INR"
    unit_weight_grams: 6
    tiers:
      - { min_qty: 6000, price: "3.80 INR" }
      - { min_qty: 10000, price: "3.60 INR" }
    weight_options:
      - { option: Capacity, value: "50 Gram", grams_per_unit: 4 }
  label:
    name: Round label
    price: "2 INR"
"#;

    #[test]
    fn parses_products_tiers_and_weights() -> TestResult {
        let catalog = Catalog::from_yaml_str(CATALOG)?;
        let pouch = catalog.get("kraft-pouch").ok_or("missing pouch")?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.currency().iso_alpha_code, "INR");
        assert_eq!(resolve_unit_price(pouch, 7000).unit_price, dec!(3.80));
        assert_eq!(resolve_unit_price(pouch, 12000).unit_price, dec!(3.60));
        assert_eq!(resolve_unit_price(pouch, 3000).unit_price, dec!(45));

        let capacity = Customization::from_pairs([("Capacity", "50 Gram")]);
        assert_eq!(resolve_line_weight(pouch, &capacity, 10).line_grams, 40);
        assert_eq!(resolve_line_weight(pouch, &Customization::new(), 10).line_grams, 60);

        assert_eq!(catalog.tax_rate().map(|rate| rate.tax_on(dec!(1000))).transpose()?, Some(dec!(180)));

        Ok(())
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CATALOG.as_bytes())?;

        let catalog = Catalog::load(file.path())?;

        assert!(catalog.get("label").is_some());

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let yaml = r#"
products:
  a: { name: A, price: "1 INR" }
  b: { name: B, price: "1 USD" }
"#;

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn empty_catalog_has_no_currency() {
        assert!(matches!(
            Catalog::from_yaml_str("products: {}"),
            Err(CatalogError::NoCurrency)
        ));
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(parse_price("3.80INR"), Err(CatalogError::InvalidPrice(_))));
        assert!(matches!(parse_price("abc INR"), Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        assert!(matches!(parse_price("1 XYZ"), Err(CatalogError::UnknownCurrency(_))));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        let tax = TaxRate::from(parse_percentage("18%")?);
        let same = TaxRate::from(parse_percentage("0.18")?);

        assert_eq!(tax.tax_on(dec!(500))?, dec!(90));
        assert_eq!(same.tax_on(dec!(500))?, dec!(90));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_non_numbers_and_negatives() {
        for input in ["NaN%", "inf", "-inf%", "NaN", "-5%", "-0.1", "eighteen%"] {
            assert!(
                matches!(parse_percentage(input), Err(CatalogError::InvalidPercentage(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn catalog_with_unparseable_tax_rate_is_an_error() {
        let yaml = r#"
tax_rate: "NaN%"
products:
  a: { name: A, price: "1 INR" }
"#;

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn formats_amounts_in_catalog_currency() -> TestResult {
        let catalog = Catalog::from_yaml_str(CATALOG)?;

        assert!(catalog.format_amount(dec!(1264))?.contains("264"));

        Ok(())
    }
}
