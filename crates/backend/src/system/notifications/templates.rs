use ammonia::clean_text;
use contracts::domain::a002_address::aggregate::ShippingAddressSnapshot;
use contracts::shared::money::line_total;
use contracts::system::notifications::events::OrderCompletedEvent;

use super::mailer::OutgoingMail;
use crate::shared::format::format_money;

/// Short human reference: first eight hex digits of the order id
pub fn order_reference(event: &OrderCompletedEvent) -> String {
    event
        .order_id
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase()
}

fn items_table(event: &OrderCompletedEvent) -> String {
    let mut rows = String::new();
    for item in &event.items {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            clean_text(&item.product_name),
            item.quantity,
            format_money(item.product_price),
            format_money(line_total(item.product_price, item.quantity)),
        ));
    }
    format!(
        "<table>\n<tr><th>Product</th><th>Qty</th><th>Price</th><th>Subtotal</th></tr>\n{}\
         <tr><td colspan=\"3\"><strong>Total</strong></td><td><strong>{}</strong></td></tr>\n</table>",
        rows,
        format_money(event.total_amount)
    )
}

fn address_block(address: &ShippingAddressSnapshot) -> String {
    let mut lines = vec![
        clean_text(&address.recipient_name),
        clean_text(&address.address_line1),
    ];
    if let Some(line2) = &address.address_line2 {
        lines.push(clean_text(line2));
    }
    lines.push(format!(
        "{}, {} {}",
        clean_text(&address.city),
        clean_text(&address.state),
        clean_text(&address.postal_code)
    ));
    lines.push(clean_text(&address.country));
    if let Some(phone) = &address.phone {
        lines.push(clean_text(phone));
    }
    format!("<p>{}</p>", lines.join("<br>"))
}

/// Confirmation sent to the purchaser
pub fn customer_confirmation(event: &OrderCompletedEvent, from: &str) -> OutgoingMail {
    let reference = order_reference(event);
    let greeting = match &event.customer_name {
        Some(name) if !name.trim().is_empty() => format!("Hi {},", clean_text(name)),
        _ => "Hi,".to_string(),
    };
    let html = format!(
        "<h1>Thank you for your order</h1>\n<p>{}</p>\n<p>We received your order #{} and are getting it ready.</p>\n{}\n<h2>Shipping to</h2>\n{}\n",
        greeting,
        reference,
        items_table(event),
        address_block(&event.shipping_address)
    );
    OutgoingMail {
        from: from.to_string(),
        to: event.customer_email.clone(),
        subject: format!("Order confirmation #{}", reference),
        html,
    }
}

/// Notice for the shop operator
pub fn admin_new_order(event: &OrderCompletedEvent, from: &str, admin_email: &str) -> OutgoingMail {
    let reference = order_reference(event);
    let customer = match &event.customer_name {
        Some(name) => format!("{} &lt;{}&gt;", clean_text(name), clean_text(&event.customer_email)),
        None => clean_text(&event.customer_email),
    };
    let html = format!(
        "<h1>New order #{}</h1>\n<p>Order id: {}</p>\n<p>Customer: {}</p>\n{}\n<h2>Ship to</h2>\n{}\n",
        reference,
        event.order_id,
        customer,
        items_table(event),
        address_block(&event.shipping_address)
    );
    OutgoingMail {
        from: from.to_string(),
        to: admin_email.to_string(),
        subject: format!("New order #{} ({})", reference, format_money(event.total_amount)),
        html,
    }
}
