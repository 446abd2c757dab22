//! Executive-committee members.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::MemberId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub full_name: String,
    pub position: String,
    pub photo_url: Option<String>,
    /// Position on the public page, ascending.
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberUpdate {
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub photo_url: Option<String>,
    pub display_order: Option<i32>,
}

#[async_trait]
pub trait ExecutiveStore: Send + Sync {
    /// Ordered by `display_order`, then name.
    async fn list(&self) -> Result<Vec<MemberRecord>, StoreError>;
    async fn get(&self, id: MemberId) -> Result<Option<MemberRecord>, StoreError>;
    async fn create(&self, record: MemberRecord) -> Result<(), StoreError>;
    async fn update(
        &self,
        id: MemberId,
        changes: MemberUpdate,
    ) -> Result<Option<MemberRecord>, StoreError>;
    async fn delete(&self, id: MemberId) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgExecutiveStore {
    pool: Arc<PgPool>,
}

impl PgExecutiveStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, full_name, position, photo_url, display_order, created_at, updated_at";

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<MemberRecord, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("member_row", e.to_string());
    Ok(MemberRecord {
        id: MemberId::from_uuid(row.try_get("id").map_err(map)?),
        full_name: row.try_get("full_name").map_err(map)?,
        position: row.try_get("position").map_err(map)?,
        photo_url: row.try_get("photo_url").map_err(map)?,
        display_order: row.try_get("display_order").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}

#[async_trait]
impl ExecutiveStore for PgExecutiveStore {
    async fn list(&self) -> Result<Vec<MemberRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM executive_members ORDER BY display_order ASC, full_name ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("executive_list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: MemberId) -> Result<Option<MemberRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM executive_members WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("executive_get", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn create(&self, record: MemberRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO executive_members
                (id, full_name, position, photo_url, display_order, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.full_name)
        .bind(&record.position)
        .bind(&record.photo_url)
        .bind(record.display_order)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("executive_create", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: MemberId,
        changes: MemberUpdate,
    ) -> Result<Option<MemberRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE executive_members SET
                full_name = COALESCE($2, full_name),
                position = COALESCE($3, position),
                photo_url = COALESCE($4, photo_url),
                display_order = COALESCE($5, display_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.full_name)
        .bind(&changes.position)
        .bind(&changes.photo_url)
        .bind(changes.display_order)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("executive_update", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: MemberId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM executive_members WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("executive_delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
