//! Fixtures for database tests: a migrated SQLite file per test plus
//! helpers that seed users, products and addresses.

use chrono::Utc;
use contracts::domain::a001_product::aggregate::{Product, ProductId};
use contracts::domain::a002_address::aggregate::{Address, AddressDto};
use contracts::domain::common::AggregateId;
use contracts::system::users::User;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tempfile::TempDir;

use crate::domain::a001_product::repository::{Column as ProductColumn, Entity as ProductEntity};
use crate::domain::{a001_product, a002_address};
use crate::shared::data::{db, migration_runner};
use crate::system::users;

pub struct TestDb {
    pub db: DatabaseConnection,
    // keeps the database file alive for the duration of the test
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = db::connect(&dir.path().join("storefront.db")).await.unwrap();
        migration_runner::run_migrations(&db).await.unwrap();
        Self { db, _dir: dir }
    }
}

pub async fn create_user(db: &DatabaseConnection, email: &str, is_admin: bool) -> User {
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: Some(email.split('@').next().unwrap_or(email).to_string()),
        is_admin,
        created_at: Utc::now().to_rfc3339(),
    };
    users::repository::insert(db, &user).await.unwrap();
    user
}

pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    price_cents: i64,
    stock: i32,
) -> Product {
    let slug = format!("{}-{}", name.to_lowercase().replace(' ', "-"), uuid::Uuid::new_v4());
    let product = Product::new_for_insert(name.to_string(), slug, Decimal::new(price_cents, 2), stock);
    a001_product::repository::insert(db, &product).await.unwrap();
    product
}

pub fn address_dto(city: &str, is_default: bool) -> AddressDto {
    AddressDto {
        recipient_name: "Ada Lovelace".into(),
        phone: Some("+44 20 7946 0000".into()),
        address_line1: "12 St James's Square".into(),
        address_line2: None,
        city: city.into(),
        state: "Greater London".into(),
        postal_code: "SW1Y 4JH".into(),
        country: "GB".into(),
        is_default,
    }
}

pub async fn create_address(db: &DatabaseConnection, user_id: &str, city: &str) -> Address {
    a002_address::service::create(db, user_id, address_dto(city, false))
        .await
        .unwrap()
}

async fn update_product(db: &DatabaseConnection, id: &ProductId, column: ProductColumn, value: SimpleExpr) {
    ProductEntity::update_many()
        .col_expr(column, value)
        .filter(ProductColumn::Id.eq(id.as_string()))
        .exec(db)
        .await
        .unwrap();
}

pub async fn set_price(db: &DatabaseConnection, id: &ProductId, price_cents: i64) {
    update_product(db, id, ProductColumn::PriceCents, Expr::value(price_cents)).await;
}

pub async fn set_stock(db: &DatabaseConnection, id: &ProductId, stock: i32) {
    update_product(db, id, ProductColumn::Stock, Expr::value(stock)).await;
}

pub async fn deactivate_product(db: &DatabaseConnection, id: &ProductId) {
    update_product(db, id, ProductColumn::IsActive, Expr::value(false)).await;
}

pub async fn soft_delete_product(db: &DatabaseConnection, id: &ProductId) {
    update_product(db, id, ProductColumn::DeletedAt, Expr::value(Utc::now())).await;
}

/// Removes the row for good; order lines keep their snapshot
pub async fn hard_delete_product(db: &DatabaseConnection, id: &ProductId) {
    ProductEntity::delete_by_id(id.as_string())
        .exec(db)
        .await
        .unwrap();
}

pub async fn product_stock(db: &DatabaseConnection, id: &ProductId) -> i32 {
    a001_product::repository::get_by_id(db, id)
        .await
        .unwrap()
        .unwrap()
        .stock
}
