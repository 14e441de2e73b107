use axum::{extract::Path, Json};
use contracts::domain::a001_product::aggregate::{ProductId, ProductStockDto};
use contracts::domain::common::AggregateId;

use crate::domain::a001_product::inventory;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;

/// GET /api/products/:id/stock
pub async fn get_stock(Path(id): Path<String>) -> Result<Json<ProductStockDto>, AppError> {
    let product_id = ProductId::from_string(&id).map_err(|_| AppError::ProductNotFound)?;
    let stock = inventory::get_stock(get_connection()?, &product_id).await?;
    Ok(Json(ProductStockDto { product_id, stock }))
}
