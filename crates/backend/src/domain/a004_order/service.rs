use contracts::domain::a004_order::aggregate::{
    AdminOrder, AdminOrderListResponse, Order, OrderId, OrderListResponse, OrderStatus, PurchaserSummary,
};
use contracts::domain::common::AggregateId;
use contracts::shared::pagination::{PageQuery, Pagination};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use super::repository;
use crate::shared::error::AppError;
use crate::system::users;

fn parse_id(id: &str) -> Result<OrderId, AppError> {
    OrderId::from_string(id).map_err(|_| AppError::OrderNotFound)
}

/// Order of the given user; someone else's order is reported as missing
pub async fn get_by_id(db: &DatabaseConnection, user_id: &str, id: &str) -> Result<Order, AppError> {
    let id = parse_id(id)?;
    repository::get_for_user(db, user_id, &id)
        .await?
        .ok_or(AppError::OrderNotFound)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: &str,
    query: &PageQuery,
) -> Result<OrderListResponse, AppError> {
    let (orders, total) = repository::list_for_user(db, user_id, query).await?;
    Ok(OrderListResponse {
        orders,
        pagination: Pagination::new(query, total),
    })
}

/// Every order in the shop with a short purchaser summary
pub async fn list_all(db: &DatabaseConnection, query: &PageQuery) -> Result<AdminOrderListResponse, AppError> {
    let (orders, total) = repository::list_all(db, query).await?;

    let mut user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
    user_ids.sort();
    user_ids.dedup();
    let purchasers = users::repository::get_many(db, &user_ids).await?;

    let orders = orders
        .into_iter()
        .map(|order| {
            let user = purchasers.get(&order.user_id).map(|u| PurchaserSummary {
                id: u.id.clone(),
                email: u.email.clone(),
                name: u.name.clone(),
            });
            AdminOrder { order, user }
        })
        .collect();

    Ok(AdminOrderListResponse {
        orders,
        pagination: Pagination::new(query, total),
    })
}

/// Set any status on any order. Transitions are not restricted.
pub async fn update_status(db: &DatabaseConnection, id: &str, status: OrderStatus) -> Result<Order, AppError> {
    let id = parse_id(id)?;
    let current = repository::get_by_id(db, &id).await?.ok_or(AppError::OrderNotFound)?;

    if current.status.is_terminal() && current.status != status {
        warn!(
            "Order {} moved out of terminal status {} to {}",
            id,
            current.status.as_str(),
            status.as_str()
        );
    }

    if !repository::update_status(db, &id, status).await? {
        return Err(AppError::OrderNotFound);
    }
    info!("Order {} status: {} -> {}", id, current.status.as_str(), status.as_str());

    repository::get_by_id(db, &id).await?.ok_or(AppError::OrderNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_order::checkout::{build_order, CheckoutLine};
    use crate::shared::test_support::{self, TestDb};
    use chrono::{Duration, Utc};
    use contracts::domain::a001_product::aggregate::Product;

    async fn seed_order(db: &DatabaseConnection, user_id: &str, product: &Product, minutes_ago: i64) -> Order {
        let address = test_support::create_address(db, user_id, "London").await;
        let lines = vec![CheckoutLine {
            cart_item_id: String::new(),
            product: product.clone(),
            quantity: 1,
        }];
        let mut order = build_order(user_id, address.snapshot(), &lines, Utc::now());
        order.created_at = Utc::now() - Duration::minutes(minutes_ago);
        order.updated_at = order.created_at;
        repository::insert(db, &order).await.unwrap();
        order
    }

    fn page(page: u64, limit: u64) -> PageQuery {
        PageQuery {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[tokio::test]
    async fn test_user_list_is_paged_newest_first() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;
        let mug = test_support::create_product(&t.db, "Mug", 1000, 5).await;
        let oldest = seed_order(&t.db, &ada.id, &mug, 30).await;
        let newest = seed_order(&t.db, &ada.id, &mug, 10).await;
        let middle = seed_order(&t.db, &ada.id, &mug, 20).await;
        seed_order(&t.db, &bob.id, &mug, 5).await;

        let first = list_for_user(&t.db, &ada.id, &page(1, 2)).await.unwrap();
        let ids: Vec<OrderId> = first.orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id]);
        assert_eq!(first.pagination.total, 3);
        assert_eq!(first.pagination.total_pages, 2);

        let second = list_for_user(&t.db, &ada.id, &page(2, 2)).await.unwrap();
        assert_eq!(second.orders.len(), 1);
        assert_eq!(second.orders[0].id, oldest.id);
        assert_eq!(second.orders[0].items.len(), 1);

        let beyond = list_for_user(&t.db, &ada.id, &page(5, 2)).await.unwrap();
        assert!(beyond.orders.is_empty());
        assert_eq!(beyond.pagination.total, 3);

        let far = list_for_user(&t.db, &ada.id, &page(u64::MAX, 50)).await.unwrap();
        assert!(far.orders.is_empty());
        let far = list_all(&t.db, &page(u64::MAX, 50)).await.unwrap();
        assert!(far.orders.is_empty());
        assert_eq!(far.pagination.total, 4);
    }

    #[tokio::test]
    async fn test_get_by_id_is_scoped_to_owner() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;
        let mug = test_support::create_product(&t.db, "Mug", 1000, 5).await;
        let order = seed_order(&t.db, &ada.id, &mug, 1).await;

        let found = get_by_id(&t.db, &ada.id, &order.id.as_string()).await.unwrap();
        assert_eq!(found.id, order.id);

        let err = get_by_id(&t.db, &bob.id, &order.id.as_string()).await.unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
        let err = get_by_id(&t.db, &ada.id, "not-an-id").await.unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_admin_list_carries_purchaser() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let bob = test_support::create_user(&t.db, "bob@example.com", false).await;
        let mug = test_support::create_product(&t.db, "Mug", 1000, 5).await;
        seed_order(&t.db, &ada.id, &mug, 2).await;
        seed_order(&t.db, &bob.id, &mug, 1).await;

        let all = list_all(&t.db, &PageQuery::default()).await.unwrap();
        assert_eq!(all.pagination.total, 2);
        let emails: Vec<&str> = all
            .orders
            .iter()
            .map(|o| o.user.as_ref().unwrap().email.as_str())
            .collect();
        assert_eq!(emails, vec!["bob@example.com", "ada@example.com"]);

        let json = serde_json::to_value(&all.orders[0]).unwrap();
        assert_eq!(json["user"]["email"], "bob@example.com");
        assert_eq!(json["status"], "PAID");
    }

    #[tokio::test]
    async fn test_status_can_move_between_any_values() {
        let t = TestDb::new().await;
        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let mug = test_support::create_product(&t.db, "Mug", 1000, 5).await;
        let order = seed_order(&t.db, &ada.id, &mug, 1).await;
        let id = order.id.as_string();

        let delivered = update_status(&t.db, &id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        let reopened = update_status(&t.db, &id, OrderStatus::Pending).await.unwrap();
        assert_eq!(reopened.status, OrderStatus::Pending);
        assert!(reopened.updated_at >= order.updated_at);

        // status is the only thing an update touches
        assert_eq!(reopened.total_amount, order.total_amount);
        assert_eq!(reopened.items, order.items);

        let err = update_status(&t.db, &OrderId::new_v4().as_string(), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
    }
}
