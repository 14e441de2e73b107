//! Inventory ledger: the stock-count authority for products.
//!
//! Stock is read freely but only ever decremented inside the checkout
//! transaction, which is why [`decrement`] takes a `DatabaseTransaction`
//! rather than any connection.

use chrono::Utc;
use contracts::domain::a001_product::aggregate::ProductId;
use contracts::domain::common::AggregateId;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter};

use super::repository::{self, Column, Entity};
use crate::shared::error::AppError;

/// Current on-hand count. Soft-deleted products are reported as not found.
pub async fn get_stock<C: ConnectionTrait>(db: &C, product_id: &ProductId) -> Result<i32, AppError> {
    match repository::get_by_id(db, product_id).await? {
        Some(product) if !product.is_deleted() => Ok(product.stock),
        _ => Err(AppError::ProductNotFound),
    }
}

/// Take `amount` units off the product's stock.
///
/// The update only matches while the product is purchasable and has at
/// least `amount` units left, so stock never goes negative no matter how
/// many checkouts race for it. A miss is classified from the row as seen
/// inside the same transaction.
pub async fn decrement(
    txn: &DatabaseTransaction,
    product_id: &ProductId,
    amount: i32,
) -> Result<(), AppError> {
    if amount < 1 {
        return Err(AppError::Validation(format!(
            "Decrement amount must be positive, got {}",
            amount
        )));
    }

    let result = Entity::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).sub(amount))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(product_id.as_string()))
        .filter(Column::Stock.gte(amount))
        .filter(Column::IsActive.eq(true))
        .filter(Column::DeletedAt.is_null())
        .exec(txn)
        .await?;

    if result.rows_affected == 1 {
        return Ok(());
    }

    let current = Entity::find_by_id(product_id.as_string()).one(txn).await?;
    match current {
        None => Err(AppError::ProductNotFound),
        Some(m) if !m.is_active || m.deleted_at.is_some() => Err(AppError::ProductUnavailable {
            product_name: m.name,
        }),
        Some(m) => Err(AppError::InsufficientStock {
            product_name: m.name,
            available: m.stock,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{self, TestDb};
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn test_get_stock() {
        let t = TestDb::new().await;
        let product = test_support::create_product(&t.db, "Mug", 1200, 7).await;
        assert_eq!(get_stock(&t.db, &product.id).await.unwrap(), 7);

        let missing = get_stock(&t.db, &ProductId::new_v4()).await.unwrap_err();
        assert_eq!(missing.code(), "PRODUCT_NOT_FOUND");

        test_support::soft_delete_product(&t.db, &product.id).await;
        assert!(get_stock(&t.db, &product.id).await.is_err());
    }

    #[tokio::test]
    async fn test_decrement_within_stock() {
        let t = TestDb::new().await;
        let product = test_support::create_product(&t.db, "Mug", 1200, 5).await;

        let txn = t.db.begin().await.unwrap();
        decrement(&txn, &product.id, 5).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(get_stock(&t.db, &product.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let t = TestDb::new().await;
        let product = test_support::create_product(&t.db, "Mug", 1200, 2).await;

        let txn = t.db.begin().await.unwrap();
        let err = decrement(&txn, &product.id, 3).await.unwrap_err();
        txn.rollback().await.unwrap();

        match err {
            AppError::InsufficientStock {
                product_name,
                available,
            } => {
                assert_eq!(product_name, "Mug");
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(get_stock(&t.db, &product.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_decrement_refuses_unpurchasable_products() {
        let t = TestDb::new().await;
        let inactive = test_support::create_product(&t.db, "Old mug", 900, 10).await;
        test_support::deactivate_product(&t.db, &inactive.id).await;

        let txn = t.db.begin().await.unwrap();
        let err = decrement(&txn, &inactive.id, 1).await.unwrap_err();
        assert_eq!(err.code(), "PRODUCT_UNAVAILABLE");

        let err = decrement(&txn, &ProductId::new_v4(), 1).await.unwrap_err();
        assert_eq!(err.code(), "PRODUCT_NOT_FOUND");

        let err = decrement(&txn, &inactive.id, 0).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_rolled_back_decrement_leaves_stock() {
        let t = TestDb::new().await;
        let product = test_support::create_product(&t.db, "Mug", 1200, 4).await;

        let txn = t.db.begin().await.unwrap();
        decrement(&txn, &product.id, 3).await.unwrap();
        txn.rollback().await.unwrap();

        assert_eq!(get_stock(&t.db, &product.id).await.unwrap(), 4);
    }
}
