use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::system::auth::middleware::{require_admin, require_auth};

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // PUBLIC
        // ========================================
        .route(
            "/api/products/:id/stock",
            get(handlers::a001_product::get_stock),
        )
        // ========================================
        // CUSTOMER ROUTES (auth)
        // ========================================
        // A002 Address book
        .route(
            "/api/addresses",
            get(handlers::a002_address::list)
                .post(handlers::a002_address::create)
                .layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/addresses/:id",
            get(handlers::a002_address::get_by_id)
                .patch(handlers::a002_address::update)
                .delete(handlers::a002_address::delete)
                .layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/addresses/:id/default",
            patch(handlers::a002_address::set_default).layer(middleware::from_fn(require_auth)),
        )
        // A003 Cart
        .route(
            "/api/cart",
            get(handlers::a003_cart::get)
                .delete(handlers::a003_cart::clear)
                .layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/cart/items",
            post(handlers::a003_cart::add_item).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/cart/items/:item_id",
            patch(handlers::a003_cart::update_item)
                .delete(handlers::a003_cart::remove_item)
                .layer(middleware::from_fn(require_auth)),
        )
        // A004 Orders
        .route(
            "/api/orders/checkout",
            post(handlers::a004_order::checkout).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/orders",
            get(handlers::a004_order::list).layer(middleware::from_fn(require_auth)),
        )
        .route(
            "/api/orders/:id",
            get(handlers::a004_order::get_by_id).layer(middleware::from_fn(require_auth)),
        )
        // ========================================
        // ADMIN ROUTES
        // ========================================
        .route(
            "/api/orders/admin/all",
            get(handlers::a004_order::admin_list).layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/api/orders/admin/:id/status",
            patch(handlers::a004_order::update_status).layer(middleware::from_fn(require_admin)),
        )
}
