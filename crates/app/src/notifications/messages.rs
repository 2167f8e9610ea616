//! Customer notification messages.

use presswork::orders::Order;

use crate::notifications::Email;

fn summary(order: &Order) -> String {
    let totals = order.totals();

    format!(
        "<table>\
         <tr><td>Subtotal</td><td>{}</td></tr>\
         <tr><td>Shipping</td><td>{}</td></tr>\
         <tr><td>Tax</td><td>{}</td></tr>\
         <tr><td>Total</td><td>{}</td></tr>\
         <tr><td>Paid</td><td>{}</td></tr>\
         <tr><td>Balance due</td><td>{}</td></tr>\
         </table>",
        totals.subtotal,
        totals.shipping_cost,
        totals.tax,
        totals.total,
        order.paid_amount(),
        order.remaining_amount(),
    )
}

/// Confirmation sent after checkout.
pub fn order_placed(order: &Order) -> Email {
    let address = order.shipping_address();

    Email::new(
        address.email.clone(),
        format!("Order {} placed", order.number()),
        format!(
            "<h1>Thank you, {}</h1><p>We have received order <strong>{}</strong>.</p>{}",
            address.name,
            order.number(),
            summary(order),
        ),
    )
}

/// Sent when an order is packed and waiting for the balance or pickup.
pub fn order_ready(order: &Order) -> Email {
    let address = order.shipping_address();

    let next_step = if order.remaining_amount().is_zero() {
        "It is fully paid and will be handed to our courier shortly.".to_string()
    } else {
        format!(
            "Please pay the balance of {} so we can ship it.",
            order.remaining_amount()
        )
    };

    Email::new(
        address.email.clone(),
        format!("Order {} is ready", order.number()),
        format!(
            "<h1>Your order is ready</h1><p>Order <strong>{}</strong> has been printed and packed.</p><p>{}</p>{}",
            order.number(),
            next_step,
            summary(order),
        ),
    )
}

/// Sent once the carrier has accepted the shipment.
pub fn order_shipped(order: &Order) -> Email {
    let address = order.shipping_address();

    let tracking = order
        .shipment()
        .and_then(|shipment| shipment.tracking_code.as_deref())
        .map(|code| format!("<p>Tracking code: <strong>{code}</strong></p>"))
        .unwrap_or_default();

    Email::new(
        address.email.clone(),
        format!("Order {} shipped", order.number()),
        format!(
            "<h1>Your order is on its way</h1><p>Order <strong>{}</strong> has been shipped.</p>{}",
            order.number(),
            tracking,
        ),
    )
}
