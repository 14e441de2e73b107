use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_product::aggregate::ProductId;
use crate::domain::a002_address::aggregate::ShippingAddressSnapshot;
use crate::shared::money::line_total;
use crate::shared::pagination::Pagination;

crate::uuid_id!(
    /// Unique order identifier
    OrderId
);

crate::uuid_id!(
    /// Unique order line identifier
    OrderItemId
);

// ============================================================================
// Status
// ============================================================================

/// Order lifecycle status.
///
/// Orders are created as `Paid`. Administrators may move an order to any
/// status; `Delivered` and `Cancelled` are terminal only by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A committed order.
///
/// Everything except `status` is written once at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: ShippingAddressSnapshot,
    /// Placeholder payment reference, never verified against a gateway
    pub payment_ref: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the snapshotted lines; equals `total_amount` for every committed order
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| line_total(i.product_price, i.quantity))
            .sum()
    }
}

/// Snapshot of one purchased product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    /// Traceability only; `None` once the product row is gone
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub product_slug: String,
    pub product_price: Decimal,
    pub quantity: i32,
}

/// Purchaser shown on the admin order list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaserSummary {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub user: Option<PurchaserSummary>,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// `POST /api/orders/checkout`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDto {
    pub address_id: String,
}

/// `PATCH /api/orders/admin/:id/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminOrderListResponse {
    pub orders: Vec<AdminOrder>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("SHIPPING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
        let dto: UpdateOrderStatusDto = serde_json::from_str(r#"{"status":"SHIPPED"}"#).unwrap();
        assert_eq!(dto.status, OrderStatus::Shipped);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }
}
