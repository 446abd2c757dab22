//! Meetings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::MeetingId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: MeetingId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Ordered by start time, soonest first.
    async fn list(&self) -> Result<Vec<MeetingRecord>, StoreError>;
    async fn get(&self, id: MeetingId) -> Result<Option<MeetingRecord>, StoreError>;
    async fn create(&self, record: MeetingRecord) -> Result<(), StoreError>;
    async fn update(
        &self,
        id: MeetingId,
        changes: MeetingUpdate,
    ) -> Result<Option<MeetingRecord>, StoreError>;
    async fn delete(&self, id: MeetingId) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgMeetingStore {
    pool: Arc<PgPool>,
}

impl PgMeetingStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, title, description, location, starts_at, ends_at, created_at, updated_at";

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<MeetingRecord, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("meeting_row", e.to_string());
    Ok(MeetingRecord {
        id: MeetingId::from_uuid(row.try_get("id").map_err(map)?),
        title: row.try_get("title").map_err(map)?,
        description: row.try_get("description").map_err(map)?,
        location: row.try_get("location").map_err(map)?,
        starts_at: row.try_get("starts_at").map_err(map)?,
        ends_at: row.try_get("ends_at").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}

#[async_trait]
impl MeetingStore for PgMeetingStore {
    async fn list(&self) -> Result<Vec<MeetingRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM meetings ORDER BY starts_at ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("meetings_list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: MeetingId) -> Result<Option<MeetingRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM meetings WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("meetings_get", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn create(&self, record: MeetingRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO meetings
                (id, title, description, location, starts_at, ends_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.location)
        .bind(record.starts_at)
        .bind(record.ends_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("meetings_create", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: MeetingId,
        changes: MeetingUpdate,
    ) -> Result<Option<MeetingRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE meetings SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(changes.starts_at)
        .bind(changes.ends_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("meetings_update", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: MeetingId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("meetings_delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
