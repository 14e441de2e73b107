use chrono::Utc;
use contracts::domain::a001_product::aggregate::ProductId;
use contracts::domain::a003_cart::aggregate::{CartId, CartItemId};
use contracts::domain::common::AggregateId;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// One cart per user
pub mod cart {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a003_carts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: String,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Lines of a cart, unique per (cart, product)
pub mod cart_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "a003_cart_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub cart_id: String,
        pub product_id: String,
        pub quantity: i32,
        pub created_at: chrono::DateTime<chrono::Utc>,
        pub updated_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn find_cart_by_user<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Option<cart::Model>, DbErr> {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Returns the user's cart, creating it on first access.
///
/// Two concurrent first requests both end up with the same row: the loser
/// of the insert race hits the unique `user_id` and does nothing.
pub async fn get_or_create_cart<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<cart::Model, DbErr> {
    if let Some(existing) = find_cart_by_user(db, user_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let active = cart::ActiveModel {
        id: Set(CartId::new_v4().as_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    cart::Entity::insert(active)
        .on_conflict(OnConflict::column(cart::Column::UserId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    find_cart_by_user(db, user_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("cart of user {}", user_id)))
}

/// Items in the order their products were first added
pub async fn list_items<C: ConnectionTrait>(db: &C, cart_id: &str) -> Result<Vec<cart_item::Model>, DbErr> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await
}

pub async fn find_item<C: ConnectionTrait>(
    db: &C,
    cart_id: &str,
    item_id: &CartItemId,
) -> Result<Option<cart_item::Model>, DbErr> {
    cart_item::Entity::find_by_id(item_id.as_string())
        .filter(cart_item::Column::CartId.eq(cart_id))
        .one(db)
        .await
}

pub async fn find_item_by_product<C: ConnectionTrait>(
    db: &C,
    cart_id: &str,
    product_id: &ProductId,
) -> Result<Option<cart_item::Model>, DbErr> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id.as_string()))
        .one(db)
        .await
}

/// Insert a new line unless the cart already holds the product.
///
/// Returns `false` when a line for the product exists, including one
/// inserted concurrently; the caller merges into it instead.
pub async fn insert_item_if_absent<C: ConnectionTrait>(
    db: &C,
    cart_id: &str,
    product_id: &ProductId,
    quantity: i32,
) -> Result<bool, DbErr> {
    let now = Utc::now();
    let active = cart_item::ActiveModel {
        id: Set(CartItemId::new_v4().as_string()),
        cart_id: Set(cart_id.to_string()),
        product_id: Set(product_id.as_string()),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = cart_item::Entity::insert(active)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(inserted > 0)
}

/// Compare-and-set of a line quantity: only applies while the line still
/// holds `expected` units.
pub async fn replace_item_quantity<C: ConnectionTrait>(
    db: &C,
    item_id: &str,
    expected: i32,
    quantity: i32,
) -> Result<bool, DbErr> {
    let result = cart_item::Entity::update_many()
        .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
        .col_expr(cart_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(cart_item::Column::Id.eq(item_id))
        .filter(cart_item::Column::Quantity.eq(expected))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn set_item_quantity<C: ConnectionTrait>(db: &C, item_id: &str, quantity: i32) -> Result<bool, DbErr> {
    let result = cart_item::Entity::update_many()
        .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
        .col_expr(cart_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(cart_item::Column::Id.eq(item_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete_item<C: ConnectionTrait>(db: &C, cart_id: &str, item_id: &CartItemId) -> Result<bool, DbErr> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::Id.eq(item_id.as_string()))
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete_all_items<C: ConnectionTrait>(db: &C, cart_id: &str) -> Result<u64, DbErr> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Delete a line only if it still holds exactly `quantity` units.
///
/// Used by checkout to consume what it validated and nothing else.
pub async fn delete_consumed_item<C: ConnectionTrait>(
    db: &C,
    cart_id: &str,
    item_id: &str,
    quantity: i32,
) -> Result<bool, DbErr> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::Id.eq(item_id))
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::Quantity.eq(quantity))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn touch_cart<C: ConnectionTrait>(db: &C, cart_id: &str) -> Result<(), DbErr> {
    cart::Entity::update_many()
        .col_expr(cart::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(cart::Column::Id.eq(cart_id))
        .exec(db)
        .await?;
    Ok(())
}
