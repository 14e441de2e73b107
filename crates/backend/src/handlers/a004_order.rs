use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a004_order::aggregate::{
    AdminOrderListResponse, CheckoutDto, Order, OrderListResponse, UpdateOrderStatusDto,
};
use contracts::shared::pagination::PageQuery;

use crate::domain::a004_order::checkout as coordinator;
use crate::domain::a004_order::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;
use crate::system::notifications;

/// POST /api/orders/checkout
pub async fn checkout(
    user: CurrentUser,
    payload: Result<Json<CheckoutDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let Json(dto) = payload?;
    let notifier = notifications::notifier();
    let db = get_connection()?;
    let order = coordinator::checkout(db, notifier.as_ref(), user.user_id(), &dto.address_id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders?page=&limit=
pub async fn list(
    user: CurrentUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<OrderListResponse>, AppError> {
    let Query(query) = query?;
    Ok(Json(service::list_for_user(get_connection()?, user.user_id(), &query).await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(user: CurrentUser, Path(id): Path<String>) -> Result<Json<Order>, AppError> {
    Ok(Json(service::get_by_id(get_connection()?, user.user_id(), &id).await?))
}

/// GET /api/orders/admin/all
pub async fn admin_list(
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<AdminOrderListResponse>, AppError> {
    let Query(query) = query?;
    Ok(Json(service::list_all(get_connection()?, &query).await?))
}

/// PATCH /api/orders/admin/:id/status
pub async fn update_status(
    Path(id): Path<String>,
    payload: Result<Json<UpdateOrderStatusDto>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Json(dto) = payload?;
    Ok(Json(service::update_status(get_connection()?, &id, dto.status).await?))
}
