use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::error::ErrorResponse;
use contracts::shared::money::MoneyError;
use sea_orm::DbErr;
use serde_json::json;

/// Failure of a storefront operation.
///
/// Every user-facing variant has a stable code; `Database` and `Internal`
/// are system errors and surface as `INTERNAL_ERROR`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Administrator access required")]
    Forbidden,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Product is not available for purchase")]
    ProductInactive,

    #[error("Insufficient stock for {product_name}: only {available} available")]
    InsufficientStock { product_name: String, available: i32 },

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("Address not found")]
    AddressNotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("{product_name} is no longer available")]
    ProductUnavailable { product_name: String },

    #[error("Cart changed during checkout, please review it and try again")]
    CartChanged,

    #[error("Order not found")]
    OrderNotFound,

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::ProductNotFound => "PRODUCT_NOT_FOUND",
            AppError::ProductInactive => "PRODUCT_INACTIVE",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::CartItemNotFound => "CART_ITEM_NOT_FOUND",
            AppError::AddressNotFound => "ADDRESS_NOT_FOUND",
            AppError::EmptyCart => "EMPTY_CART",
            AppError::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
            AppError::CartChanged => "CART_CHANGED",
            AppError::OrderNotFound => "ORDER_NOT_FOUND",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::ProductInactive
            | AppError::InsufficientStock { .. }
            | AppError::EmptyCart
            | AppError::ProductUnavailable { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ProductNotFound
            | AppError::CartItemNotFound
            | AppError::AddressNotFound
            | AppError::OrderNotFound => StatusCode::NOT_FOUND,
            AppError::CartChanged => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Storage or plumbing failure rather than a user-correctable condition
    pub fn is_system(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InsufficientStock {
                product_name,
                available,
            } => Some(json!({ "productName": product_name, "available": available })),
            AppError::ProductUnavailable { product_name } => {
                Some(json!({ "productName": product_name }))
            }
            _ => None,
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        if self.is_system() {
            return ErrorResponse::new(self.code(), "Internal server error");
        }
        let body = ErrorResponse::new(self.code(), self.to_string());
        match self.details() {
            Some(details) => body.with_details(details),
            None => body,
        }
    }
}

impl From<MoneyError> for AppError {
    fn from(e: MoneyError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_system() {
            tracing::error!("Request failed: {:#}", self);
        }
        (self.status(), Json(self.to_response_body())).into_response()
    }
}
