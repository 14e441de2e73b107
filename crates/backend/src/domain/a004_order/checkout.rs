//! Order transaction coordinator.
//!
//! Turns the user's cart into an order. Address, cart and products are read
//! and validated first; the order is then committed in one transaction that
//! consumes the validated cart lines, decrements stock with a conditional
//! update and writes the order with its snapshot lines. Either all of it is
//! visible afterwards or none of it is. The completed-order event is emitted
//! only after the commit and its failure is never reported to the caller.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use contracts::domain::a001_product::aggregate::{Product, ProductId};
use contracts::domain::a002_address::aggregate::{AddressId, ShippingAddressSnapshot};
use contracts::domain::a004_order::aggregate::{Order, OrderId, OrderItem, OrderItemId, OrderStatus};
use contracts::domain::common::AggregateId;
use contracts::shared::money::line_total;
use contracts::system::notifications::events::OrderCompletedEvent;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{error, info, warn};

use super::repository as order_repository;
use crate::domain::a001_product::{inventory, repository as product_repository};
use crate::domain::a002_address::repository as address_repository;
use crate::domain::a003_cart::repository::{self as cart_repository, cart_item};
use crate::shared::error::AppError;
use crate::shared::format::format_money;
use crate::system::notifications::OrderNotifier;
use crate::system::users;

/// A validated cart line together with the product state it was checked against
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub cart_item_id: String,
    pub product: Product,
    pub quantity: i32,
}

/// Check every cart line against its live product, in cart order.
///
/// The first unavailable product or short line aborts the whole checkout.
pub fn validate_lines(
    items: Vec<cart_item::Model>,
    products: &HashMap<ProductId, Product>,
) -> Result<Vec<CheckoutLine>, AppError> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = ProductId::from_string(&item.product_id)
            .ok()
            .and_then(|id| products.get(&id))
            .ok_or_else(|| AppError::ProductUnavailable {
                product_name: item.product_id.clone(),
            })?;

        if !product.is_purchasable() {
            return Err(AppError::ProductUnavailable {
                product_name: product.name.clone(),
            });
        }
        if item.quantity > product.stock {
            return Err(AppError::InsufficientStock {
                product_name: product.name.clone(),
                available: product.stock,
            });
        }

        lines.push(CheckoutLine {
            cart_item_id: item.id,
            product: product.clone(),
            quantity: item.quantity,
        });
    }
    Ok(lines)
}

/// Sum of `price * quantity` at the prices the lines were validated with
pub fn compute_total(lines: &[CheckoutLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line_total(line.product.price, line.quantity))
        .sum()
}

/// Placeholder payment reference; payment is simulated as always captured
pub fn mock_payment_ref(now: DateTime<Utc>) -> String {
    format!("mock_{}", now.timestamp_millis())
}

/// The order as it will be committed: status `PAID`, product and address snapshots
pub fn build_order(
    user_id: &str,
    shipping_address: ShippingAddressSnapshot,
    lines: &[CheckoutLine],
    now: DateTime<Utc>,
) -> Order {
    let items = lines
        .iter()
        .map(|line| OrderItem {
            id: OrderItemId::new_v4(),
            product_id: Some(line.product.id),
            product_name: line.product.name.clone(),
            product_slug: line.product.slug.clone(),
            product_price: line.product.price,
            quantity: line.quantity,
        })
        .collect();

    Order {
        id: OrderId::new_v4(),
        user_id: user_id.to_string(),
        status: OrderStatus::Paid,
        total_amount: compute_total(lines),
        shipping_address,
        payment_ref: Some(mock_payment_ref(now)),
        items,
        created_at: now,
        updated_at: now,
    }
}

/// Body of the checkout transaction.
///
/// Consuming the cart lines comes first, so a second submit of the same
/// cart fails on the cart rather than on stock.
async fn apply(
    txn: &DatabaseTransaction,
    cart_id: &str,
    lines: &[CheckoutLine],
    order: &Order,
) -> Result<(), AppError> {
    let mut consumed = 0;
    for line in lines {
        if cart_repository::delete_consumed_item(txn, cart_id, &line.cart_item_id, line.quantity).await? {
            consumed += 1;
        }
    }
    if consumed == 0 {
        return Err(AppError::EmptyCart);
    }
    if consumed < lines.len() {
        return Err(AppError::CartChanged);
    }

    for line in lines {
        inventory::decrement(txn, &line.product.id, line.quantity)
            .await
            .map_err(|e| match e {
                AppError::ProductNotFound => AppError::ProductUnavailable {
                    product_name: line.product.name.clone(),
                },
                other => other,
            })?;
    }

    order_repository::insert(txn, order).await?;
    cart_repository::touch_cart(txn, cart_id).await?;
    Ok(())
}

/// Run [`apply`] in one transaction; any error rolls everything back
async fn commit(
    db: &DatabaseConnection,
    cart_id: &str,
    lines: &[CheckoutLine],
    order: &Order,
) -> Result<(), AppError> {
    let txn = db.begin().await?;
    match apply(&txn, cart_id, lines, order).await {
        Ok(()) => {
            txn.commit().await?;
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!("Checkout rollback failed for order {}: {}", order.id, rollback_err);
            }
            Err(e)
        }
    }
}

async fn place_order(db: &DatabaseConnection, user_id: &str, address_id: &str) -> Result<Order, AppError> {
    let address_id = AddressId::from_string(address_id).map_err(|_| AppError::AddressNotFound)?;
    let address = address_repository::get_for_user(db, user_id, &address_id)
        .await?
        .ok_or(AppError::AddressNotFound)?;

    let cart = cart_repository::find_cart_by_user(db, user_id)
        .await?
        .ok_or(AppError::EmptyCart)?;
    let items = cart_repository::list_items(db, &cart.id).await?;
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let product_ids: Vec<ProductId> = items
        .iter()
        .filter_map(|item| ProductId::from_string(&item.product_id).ok())
        .collect();
    let products = product_repository::get_many(db, &product_ids).await?;
    let lines = validate_lines(items, &products)?;

    let order = build_order(user_id, address.snapshot(), &lines, Utc::now());
    commit(db, &cart.id, &lines, &order).await?;
    Ok(order)
}

/// Hand the committed order to the dispatcher; failures are only logged
async fn emit_completed(db: &DatabaseConnection, notifier: &dyn OrderNotifier, order: &Order) {
    let user = match users::repository::get_by_id(db, &order.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Order {} committed for unknown user {}, no notification sent", order.id, order.user_id);
            return;
        }
        Err(e) => {
            error!("Order {} committed but purchaser lookup failed: {:?}", order.id, e);
            return;
        }
    };

    let event = OrderCompletedEvent::from_order(order, user.email, user.name);
    if let Err(e) = notifier.order_completed(event).await {
        error!("Order {} committed but notification was dropped: {}", order.id, e);
    }
}

/// Convert the user's cart into a paid order shipped to `address_id`
pub async fn checkout(
    db: &DatabaseConnection,
    notifier: &dyn OrderNotifier,
    user_id: &str,
    address_id: &str,
) -> Result<Order, AppError> {
    match place_order(db, user_id, address_id).await {
        Ok(order) => {
            info!(
                "Order {} committed for user {}: {} line(s), total {}",
                order.id,
                user_id,
                order.items.len(),
                format_money(order.total_amount)
            );
            emit_completed(db, notifier, &order).await;
            Ok(order)
        }
        Err(e) => {
            if !e.is_system() {
                warn!("Checkout rejected for user {}: {} ({})", user_id, e.code(), e);
            }
            Err(e)
        }
    }
}
