use std::path::PathBuf;

use clap::Args;
use presswork::{
    catalog::Catalog,
    customization::Customization,
    orders::{LineRequest, PaymentLedger, price_line},
    pricing::PriceSource,
    totals::OrderTotals,
    weights::WeightSource,
};
use presswork_app::config::PricingConfig;
use rust_decimal::Decimal;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Path to the YAML product catalog
    #[arg(long, env = "PRESSWORK_CATALOG")]
    catalog: PathBuf,

    /// Catalog key of the product
    #[arg(long)]
    product: String,

    /// Number of units
    #[arg(long)]
    quantity: u32,

    /// Customization choice as KEY=VALUE; may be repeated
    #[arg(long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Amount paid up front
    #[arg(long, default_value = "0")]
    advance: Decimal,

    #[command(flatten)]
    pricing: PricingConfig,
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

pub(crate) fn run(args: QuoteArgs) -> Result<(), String> {
    if args.quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }

    let catalog = Catalog::load(&args.catalog)
        .map_err(|error| format!("failed to load catalog: {error}"))?;

    let product = catalog
        .get(&args.product)
        .ok_or_else(|| format!("unknown product `{}`", args.product))?;

    debug!(product = %args.product, products = catalog.len(), "catalog loaded");

    let mut policy = args
        .pricing
        .policy()
        .map_err(|error| format!("invalid pricing settings: {error}"))?;

    if let Some(tax) = catalog.tax_rate() {
        policy.tax = tax;
    }

    let priced = price_line(
        product,
        LineRequest {
            product: product.uuid,
            quantity: args.quantity,
            customization: Customization::from_pairs(args.options),
            files: Vec::new(),
        },
    )
    .map_err(|error| format!("failed to price line: {error}"))?;

    if priced.weight.source == WeightSource::Default {
        warn!(product = %args.product, "product has no weight; using default unit weight");
    }

    let totals = OrderTotals::compute(&policy, priced.line.line_total, priced.weight.line_grams)
        .map_err(|error| format!("failed to compute totals: {error}"))?;

    let ledger = PaymentLedger::with_advance(totals.total, args.advance)
        .map_err(|error| format!("invalid advance: {error}"))?;

    let money = |amount: Decimal| {
        catalog
            .format_amount(amount)
            .map_err(|error| format!("failed to format amount: {error}"))
    };

    let price_source = match priced.price_source {
        PriceSource::Tier(index) => format!("tier {index}"),
        PriceSource::BasePrice => "base price".to_string(),
    };

    println!("product: {}", product.name);
    println!("quantity: {}", priced.line.quantity);
    println!("unit_price: {} ({price_source})", money(priced.line.unit_price)?);
    println!("weight: {} g", priced.weight.line_grams);
    println!("subtotal: {}", money(totals.subtotal)?);
    println!("shipping: {}", money(totals.shipping_cost)?);
    println!("tax: {}", money(totals.tax)?);
    println!("total: {}", money(totals.total)?);
    println!("paid: {}", money(ledger.paid())?);
    println!("balance_due: {}", money(ledger.remaining())?);

    Ok(())
}
