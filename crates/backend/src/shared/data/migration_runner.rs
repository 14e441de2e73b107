use anyhow::Context;
use sea_orm::DatabaseConnection;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

/// Schema migrations from `crates/backend/migrations`, embedded at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn has_table(pool: &SqlitePool, table_name: &str) -> anyhow::Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name = ?1",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Apply pending migrations on the pool behind `db`
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let pool = db.get_sqlite_connection_pool();

    if !has_table(pool, "_sqlx_migrations").await? {
        tracing::info!("Fresh database detected, creating storefront schema");
    }

    MIGRATOR
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;

    tracing::info!("Database migrations applied successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;

    #[tokio::test]
    async fn test_migrations_create_schema_and_rerun_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::connect(&dir.path().join("storefront.db")).await.unwrap();

        run_migrations(&conn).await.unwrap();
        let pool = conn.get_sqlite_connection_pool();
        for table in ["sys_users", "a001_products", "a003_cart_items", "a004_orders"] {
            assert!(has_table(pool, table).await.unwrap(), "{table}");
        }

        run_migrations(&conn).await.unwrap();
    }
}
