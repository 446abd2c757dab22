//! User accounts (admin surface).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::UserId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub is_active: bool,
    pub is_super_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_super_admin: Option<bool>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<UserAccount>, StoreError>;
    async fn get(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;
    async fn create(&self, account: UserAccount) -> Result<(), StoreError>;
    async fn update(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<UserAccount>, StoreError>;
    /// Irreversible; memberships and sessions go with the account.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: Arc<PgPool>,
}

impl PgUserDirectory {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, email, display_name, is_active, is_super_admin, created_at";

fn account_from_row(row: &sqlx::postgres::PgRow) -> Result<UserAccount, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("user_row", e.to_string());
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(map)?),
        email: row.try_get("email").map_err(map)?,
        display_name: row.try_get("display_name").map_err(map)?,
        is_active: row.try_get("is_active").map_err(map)?,
        is_super_admin: row.try_get("is_super_admin").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
    })
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list(&self) -> Result<Vec<UserAccount>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM users ORDER BY email ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users_list", e))?;

        rows.iter().map(account_from_row).collect()
    }

    async fn get(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users_get", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users_find_by_email", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn create(&self, account: UserAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, is_active, is_super_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(account.is_active)
        .bind(account.is_super_admin)
        .bind(account.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_create", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                display_name = COALESCE($3, display_name),
                is_active = COALESCE($4, is_active),
                is_super_admin = COALESCE($5, is_super_admin)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.email)
        .bind(&changes.display_name)
        .bind(changes.is_active)
        .bind(changes.is_super_admin)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users_update", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users_delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
