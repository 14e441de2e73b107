use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_product::aggregate::{ProductId, ProductImage};
use crate::shared::money::line_total;

crate::uuid_id!(
    /// Unique cart identifier
    CartId
);

crate::uuid_id!(
    /// Unique cart line identifier
    CartItemId
);

/// Per-user staging area for a prospective order.
///
/// Holds at most one item per product; the item order is the order in which
/// products were first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of units across all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.quantity)).sum()
    }

    /// Subtotal at current live prices; checkout recomputes it at commit time
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| line_total(i.product.price, i.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Always at least 1
    pub quantity: i32,
    pub product: CartProductSummary,
}

/// Live product fields shown next to a cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub image: Option<ProductImage>,
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// `POST /api/cart/items`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartDto {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// `PATCH /api/cart/items/:item_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemDto {
    pub quantity: i32,
}
