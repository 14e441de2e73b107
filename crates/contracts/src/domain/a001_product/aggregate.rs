use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_id!(
    /// Unique product identifier
    ProductId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Catalog product as seen by checkout.
///
/// The catalog owns the product; the storefront core only reads it and
/// decrements `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    /// On-hand count, never negative
    pub stock: i32,
    pub is_active: bool,
    /// Soft delete marker
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product for insertion
    pub fn new_for_insert(name: String, slug: String, price: Decimal, stock: i32) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new_v4(),
            name,
            slug,
            price,
            stock,
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Active and not soft-deleted
    pub fn is_purchasable(&self) -> bool {
        self.is_active && !self.is_deleted()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name must not be empty".into());
        }
        if self.slug.trim().is_empty() {
            return Err("Product slug must not be empty".into());
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err("Product price must not be negative".into());
        }
        if self.stock < 0 {
            return Err("Product stock must not be negative".into());
        }
        Ok(())
    }
}

/// Product image, ordered by `sort_order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: String,
    pub url: String,
    pub sort_order: i32,
}

/// `GET /api/products/:id/stock`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockDto {
    pub product_id: ProductId,
    pub stock: i32,
}
