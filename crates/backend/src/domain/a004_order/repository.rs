use std::collections::HashMap;

use anyhow::Context;
use chrono::Utc;
use contracts::domain::a001_product::aggregate::ProductId;
use contracts::domain::a004_order::aggregate::{Order, OrderId, OrderItem, OrderItemId, OrderStatus};
use contracts::domain::common::AggregateId;
use contracts::shared::money::{from_minor_units, to_minor_units};
use contracts::shared::pagination::PageQuery;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Order header; everything but `status` is written once
pub mod order {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a004_orders")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: String,
        pub status: String,
        pub total_cents: i64,
        /// JSON of the shipping address snapshot
        pub shipping_address: String,
        pub payment_ref: Option<String>,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Product snapshot lines of an order
pub mod order_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a004_order_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub order_id: String,
        pub line_no: i32,
        pub product_id: Option<String>,
        pub product_name: String,
        pub product_slug: String,
        pub product_price_cents: i64,
        pub quantity: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_else(|_| Uuid::nil())
}

impl From<order_item::Model> for OrderItem {
    fn from(m: order_item::Model) -> Self {
        OrderItem {
            id: OrderItemId(parse_uuid(&m.id)),
            product_id: m
                .product_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(ProductId),
            product_name: m.product_name,
            product_slug: m.product_slug,
            product_price: from_minor_units(m.product_price_cents),
            quantity: m.quantity,
        }
    }
}

fn to_order(m: order::Model, items: Vec<OrderItem>) -> Result<Order, AppError> {
    let status: OrderStatus = m
        .status
        .parse()
        .map_err(|e: String| anyhow::anyhow!("order {}: {}", m.id, e))?;
    let shipping_address = serde_json::from_str(&m.shipping_address)
        .with_context(|| format!("order {}: malformed shipping address", m.id))?;
    Ok(Order {
        id: OrderId(parse_uuid(&m.id)),
        user_id: m.user_id,
        status,
        total_amount: from_minor_units(m.total_cents),
        shipping_address,
        payment_ref: m.payment_ref,
        items,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

/// Attach lines to headers, keeping the header order
async fn with_items<C: ConnectionTrait>(db: &C, headers: Vec<order::Model>) -> Result<Vec<Order>, AppError> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = headers.iter().map(|h| h.id.clone()).collect();
    let rows = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(ids))
        .order_by_asc(order_item::Column::LineNo)
        .all(db)
        .await?;

    let mut lines: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        lines.entry(row.order_id.clone()).or_default().push(row.into());
    }

    headers
        .into_iter()
        .map(|h| {
            let items = lines.remove(&h.id).unwrap_or_default();
            to_order(h, items)
        })
        .collect()
}

/// Write the header and all lines; callers pass the checkout transaction
pub async fn insert<C: ConnectionTrait>(db: &C, order: &Order) -> Result<(), AppError> {
    let shipping_address =
        serde_json::to_string(&order.shipping_address).context("Failed to serialize shipping address")?;

    let header = order::ActiveModel {
        id: Set(order.id.as_string()),
        user_id: Set(order.user_id.clone()),
        status: Set(order.status.as_str().to_string()),
        total_cents: Set(to_minor_units(order.total_amount)?),
        shipping_address: Set(shipping_address),
        payment_ref: Set(order.payment_ref.clone()),
        created_at: Set(order.created_at),
        updated_at: Set(order.updated_at),
    };
    header.insert(db).await?;

    for (line_no, item) in order.items.iter().enumerate() {
        let line = order_item::ActiveModel {
            id: Set(item.id.as_string()),
            order_id: Set(order.id.as_string()),
            line_no: Set(line_no as i32 + 1),
            product_id: Set(item.product_id.map(|id| id.as_string())),
            product_name: Set(item.product_name.clone()),
            product_slug: Set(item.product_slug.clone()),
            product_price_cents: Set(to_minor_units(item.product_price)?),
            quantity: Set(item.quantity),
        };
        line.insert(db).await?;
    }
    Ok(())
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &OrderId) -> Result<Option<Order>, AppError> {
    let header = order::Entity::find_by_id(id.as_string()).one(db).await?;
    match header {
        Some(h) => Ok(with_items(db, vec![h]).await?.pop()),
        None => Ok(None),
    }
}

/// Order scoped to its owner; another user's order is `None`
pub async fn get_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    id: &OrderId,
) -> Result<Option<Order>, AppError> {
    let header = order::Entity::find_by_id(id.as_string())
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    match header {
        Some(h) => Ok(with_items(db, vec![h]).await?.pop()),
        None => Ok(None),
    }
}

async fn list_page<C: ConnectionTrait>(
    db: &C,
    query: Select<order::Entity>,
    page: &PageQuery,
) -> Result<(Vec<Order>, u64), AppError> {
    let total = query.clone().count(db).await?;
    let headers = query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .limit(page.limit())
        .offset(page.offset())
        .all(db)
        .await?;
    Ok((with_items(db, headers).await?, total))
}

/// One page of the user's orders, newest first, plus the total count
pub async fn list_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    page: &PageQuery,
) -> Result<(Vec<Order>, u64), AppError> {
    let query = order::Entity::find().filter(order::Column::UserId.eq(user_id));
    list_page(db, query, page).await
}

/// One page of all orders, newest first, plus the total count
pub async fn list_all<C: ConnectionTrait>(db: &C, page: &PageQuery) -> Result<(Vec<Order>, u64), AppError> {
    list_page(db, order::Entity::find(), page).await
}

pub async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: &OrderId,
    status: OrderStatus,
) -> Result<bool, DbErr> {
    let result = order::Entity::update_many()
        .col_expr(order::Column::Status, Expr::value(status.as_str()))
        .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(order::Column::Id.eq(id.as_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
