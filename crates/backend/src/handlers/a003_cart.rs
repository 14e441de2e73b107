use axum::extract::rejection::JsonRejection;
use axum::{extract::Path, Json};
use contracts::domain::a003_cart::aggregate::{AddToCartDto, Cart, UpdateCartItemDto};

use crate::domain::a003_cart::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/cart
pub async fn get(user: CurrentUser) -> Result<Json<Cart>, AppError> {
    Ok(Json(service::get_or_create_cart(get_connection()?, user.user_id()).await?))
}

/// POST /api/cart/items
pub async fn add_item(
    user: CurrentUser,
    payload: Result<Json<AddToCartDto>, JsonRejection>,
) -> Result<Json<Cart>, AppError> {
    let Json(dto) = payload?;
    Ok(Json(service::add_item(get_connection()?, user.user_id(), dto).await?))
}

/// PATCH /api/cart/items/:item_id
pub async fn update_item(
    user: CurrentUser,
    Path(item_id): Path<String>,
    payload: Result<Json<UpdateCartItemDto>, JsonRejection>,
) -> Result<Json<Cart>, AppError> {
    let Json(dto) = payload?;
    let cart =
        service::update_item_quantity(get_connection()?, user.user_id(), &item_id, dto.quantity).await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/items/:item_id
pub async fn remove_item(user: CurrentUser, Path(item_id): Path<String>) -> Result<Json<Cart>, AppError> {
    Ok(Json(service::remove_item(get_connection()?, user.user_id(), &item_id).await?))
}

/// DELETE /api/cart
pub async fn clear(user: CurrentUser) -> Result<Json<Cart>, AppError> {
    Ok(Json(service::clear(get_connection()?, user.user_id()).await?))
}
