use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::system::users::User;
use sea_orm::{ConnectionTrait, DatabaseBackend, QueryResult, Statement, Value};

const USER_COLUMNS: &str = "id, email, name, is_admin, created_at";

fn user_from_row(row: &QueryResult) -> Result<User> {
    Ok(User {
        id: row.try_get("", "id")?,
        email: row.try_get("", "email")?,
        name: row.try_get("", "name")?,
        is_admin: row.try_get::<i32>("", "is_admin")? != 0,
        created_at: row.try_get("", "created_at")?,
    })
}

/// Insert a user account
pub async fn insert<C: ConnectionTrait>(db: &C, user: &User) -> Result<()> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users (id, email, name, is_admin, created_at) VALUES (?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.email.clone().into(),
            user.name.clone().into(),
            (if user.is_admin { 1 } else { 0 }).into(),
            user.created_at.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    Ok(())
}

/// Get user by ID
pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<User>> {
    let result = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("SELECT {} FROM sys_users WHERE id = ?", USER_COLUMNS),
            [id.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(user_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Users keyed by id; unknown ids are simply absent
pub async fn get_many<C: ConnectionTrait>(db: &C, ids: &[String]) -> Result<HashMap<String, User>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let values: Vec<Value> = ids.iter().map(|id| id.clone().into()).collect();
    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!(
                "SELECT {} FROM sys_users WHERE id IN ({})",
                USER_COLUMNS, placeholders
            ),
            values,
        ))
        .await?;

    let mut users = HashMap::with_capacity(rows.len());
    for row in rows {
        let user = user_from_row(&row)?;
        users.insert(user.id.clone(), user);
    }
    Ok(users)
}

/// Count all users
pub async fn count_users<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let result = db
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match result {
        Some(row) => {
            let count: i64 = row.try_get("", "count")?;
            Ok(count as usize)
        }
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_support::{self, TestDb};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let t = TestDb::new().await;
        assert_eq!(count_users(&t.db).await.unwrap(), 0);

        let ada = test_support::create_user(&t.db, "ada@example.com", false).await;
        let root = test_support::create_user(&t.db, "root@example.com", true).await;
        assert_eq!(count_users(&t.db).await.unwrap(), 2);

        let loaded = get_by_id(&t.db, &root.id).await.unwrap().unwrap();
        assert!(loaded.is_admin);
        assert_eq!(loaded.email, "root@example.com");

        let many = get_many(&t.db, &[ada.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(many.len(), 1);
        assert_eq!(many[&ada.id].email, "ada@example.com");
    }
}
