//! End-to-end pricing, cart and order flow against the fixture catalog.
//!
//! Gift boxes cost 100 and weigh 120 g each, so ten of them come to a subtotal of
//! 1000 and 1200 g: shipping is three started 500 g steps at 28 (84), tax is 18%
//! (180), and the order total is 1264.

use jiff::Timestamp;
use presswork::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use testresult::TestResult;

const CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.yaml");

fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "+91 98450 00000".to_string(),
        line1: "12 Residency Road".to_string(),
        line2: Some("Second floor".to_string()),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560025".to_string(),
        country: "India".to_string(),
    }
}

fn policy(catalog: &Catalog) -> PricingPolicy {
    PricingPolicy {
        tax: catalog.tax_rate().unwrap_or_default(),
        ..PricingPolicy::default()
    }
}

fn place_gift_boxes(catalog: &Catalog, quantity: u32, advance: Decimal) -> TestResult<Order> {
    let product = catalog.get("gift-box").ok_or("gift-box missing from catalog")?;

    let priced = price_line(
        product,
        LineRequest {
            product: product.uuid,
            quantity,
            customization: Customization::new(),
            files: vec![FileRef::new("lid-artwork.pdf")],
        },
    )?;

    let now = Timestamp::now();

    let order = Order::place(
        NewOrder {
            number: OrderNumber::generate(now, &mut rand::thread_rng()),
            customer: CustomerUuid::new(),
            total_weight_grams: priced.weight.line_grams,
            lines: vec![priced.line],
            shipping_address: address(),
            payment_method: PaymentMethod::Online,
            advance_paid: advance,
            advance_reference: None,
        },
        &policy(catalog),
        now,
    )?;

    Ok(order)
}

fn shipment() -> Shipment {
    Shipment {
        carrier_order_id: "CO-1".to_string(),
        shipment_id: "SH-1".to_string(),
        tracking_code: None,
        created_at: Timestamp::now(),
    }
}

#[test]
fn tier_prices_follow_quantity() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let pouch = catalog.get("kraft-pouch").ok_or("kraft-pouch missing from catalog")?;

    assert_eq!(resolve_unit_price(pouch, 7000).unit_price, dec!(3.80));
    assert_eq!(resolve_unit_price(pouch, 12000).unit_price, dec!(3.60));

    let below_tiers = resolve_unit_price(pouch, 3000);

    assert_eq!(below_tiers.unit_price, dec!(45));
    assert!(below_tiers.is_fallback());

    Ok(())
}

#[test]
fn cart_merges_identical_customizations() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let pouch = catalog.get("kraft-pouch").ok_or("kraft-pouch missing from catalog")?;
    let now = Timestamp::now();

    let line = |capacity: &str, quantity| NewCartLine {
        product: pouch.uuid,
        quantity,
        customization: Customization::from_pairs([("Capacity", capacity)]),
        files: Vec::new(),
    };

    let mut cart = Cart::new(CustomerUuid::new(), now);

    let first = cart.add_line(line("50 Gram", 2), now)?;
    let merged = cart.add_line(line("50 Gram", 3), now)?;

    assert_eq!(first, merged);
    assert_eq!(cart.line(first).map(|line| line.quantity), Some(5));

    cart.add_line(line("100 Gram", 1), now)?;

    assert_eq!(cart.len(), 2);

    Ok(())
}

#[test]
fn customization_selects_the_line_weight() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let pouch = catalog.get("kraft-pouch").ok_or("kraft-pouch missing from catalog")?;
    let stickers = catalog.get("sticker-sheet").ok_or("sticker-sheet missing from catalog")?;

    let large = resolve_line_weight(pouch, &Customization::from_pairs([("capacity", "100 Gram")]), 10);

    assert_eq!(large.line_grams, 60);
    assert_eq!(large.source, WeightSource::Option);

    let unweighed = resolve_line_weight(stickers, &Customization::new(), 2);

    assert_eq!(unweighed.line_grams, 2 * DEFAULT_UNIT_WEIGHT_GRAMS);
    assert_eq!(unweighed.source, WeightSource::Default);

    Ok(())
}

#[test]
fn advance_and_balance_settle_the_order() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let mut order = place_gift_boxes(&catalog, 10, dec!(950))?;

    assert_eq!(
        *order.totals(),
        OrderTotals {
            subtotal: dec!(1000),
            shipping_cost: dec!(84),
            tax: dec!(180),
            total: dec!(1264),
        }
    );
    assert_eq!(order.remaining_amount(), dec!(314));
    assert_eq!(order.payment_status(), PaymentStatus::Pending);

    order.capture_balance(dec!(314), "pay_1", Timestamp::now())?;

    assert_eq!(order.paid_amount(), dec!(1264));
    assert_eq!(order.remaining_amount(), Decimal::ZERO);
    assert_eq!(order.payment_status(), PaymentStatus::Paid);
    assert_eq!(
        order.capture_balance(dec!(314), "pay_2", Timestamp::now()),
        Err(LedgerError::AlreadyPaid)
    );
    assert!(order.is_consistent());

    Ok(())
}

#[test]
fn shipping_requires_a_settled_ready_order() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let mut order = place_gift_boxes(&catalog, 10, dec!(950))?;

    order.transition(OrderStatus::Ready, None, Timestamp::now())?;

    assert_eq!(
        order.ensure_shippable(),
        Err(LifecycleError::BalanceOutstanding(dec!(314)))
    );

    order.capture_balance(dec!(314), "pay_1", Timestamp::now())?;
    order.record_shipment(shipment(), Timestamp::now())?;

    assert_eq!(order.status(), OrderStatus::Shipped);
    assert_eq!(
        order.record_shipment(shipment(), Timestamp::now()),
        Err(LifecycleError::AlreadyShipped)
    );

    order.transition(OrderStatus::Delivered, None, Timestamp::now())?;

    let statuses: Vec<_> = order.history().entries().iter().map(|entry| entry.status).collect();

    assert_eq!(
        statuses,
        [
            OrderStatus::Pending,
            OrderStatus::Ready,
            OrderStatus::Ready,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    );

    Ok(())
}

#[test]
fn orders_survive_serialization() -> TestResult {
    let catalog = Catalog::load(CATALOG)?;
    let order = place_gift_boxes(&catalog, 3, dec!(0))?;

    let yaml = serde_norway::to_string(&order)?;
    let restored: Order = serde_norway::from_str(&yaml)?;

    assert_eq!(restored, order);
    assert!(restored.is_consistent());

    Ok(())
}
