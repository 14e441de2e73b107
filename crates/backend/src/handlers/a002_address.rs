use axum::extract::rejection::JsonRejection;
use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_address::aggregate::{Address, AddressDto, UpdateAddressDto};

use crate::domain::a002_address::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/addresses
pub async fn list(user: CurrentUser) -> Result<Json<Vec<Address>>, AppError> {
    Ok(Json(service::list(get_connection()?, user.user_id()).await?))
}

/// GET /api/addresses/:id
pub async fn get_by_id(user: CurrentUser, Path(id): Path<String>) -> Result<Json<Address>, AppError> {
    Ok(Json(service::get(get_connection()?, user.user_id(), &id).await?))
}

/// POST /api/addresses
pub async fn create(
    user: CurrentUser,
    payload: Result<Json<AddressDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let Json(dto) = payload?;
    let address = service::create(get_connection()?, user.user_id(), dto).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// PATCH /api/addresses/:id
pub async fn update(
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateAddressDto>, JsonRejection>,
) -> Result<Json<Address>, AppError> {
    let Json(dto) = payload?;
    Ok(Json(service::update(get_connection()?, user.user_id(), &id, dto).await?))
}

/// DELETE /api/addresses/:id
pub async fn delete(user: CurrentUser, Path(id): Path<String>) -> Result<StatusCode, AppError> {
    service::remove(get_connection()?, user.user_id(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/addresses/:id/default
pub async fn set_default(user: CurrentUser, Path(id): Path<String>) -> Result<Json<Address>, AppError> {
    Ok(Json(service::set_default(get_connection()?, user.user_id(), &id).await?))
}
