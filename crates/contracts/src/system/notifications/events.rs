use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a002_address::aggregate::ShippingAddressSnapshot;
use crate::domain::a004_order::aggregate::{Order, OrderId};

/// Published after a checkout commits; consumed by the mail worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCompletedEvent {
    pub order_id: OrderId,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub items: Vec<OrderCompletedItem>,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddressSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCompletedItem {
    pub product_name: String,
    pub quantity: i32,
    pub product_price: Decimal,
}

impl OrderCompletedEvent {
    pub fn from_order(order: &Order, customer_email: String, customer_name: Option<String>) -> Self {
        Self {
            order_id: order.id,
            customer_email,
            customer_name,
            items: order
                .items
                .iter()
                .map(|i| OrderCompletedItem {
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    product_price: i.product_price,
                })
                .collect(),
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
        }
    }
}
