//! Contact messages submitted through the public form.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::MessageId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Anonymous submission from the public form.
    async fn submit(&self, record: ContactRecord) -> Result<(), StoreError>;
    /// Newest first; archived messages included only when asked.
    async fn list(&self, include_archived: bool) -> Result<Vec<ContactRecord>, StoreError>;
    async fn archive(&self, id: MessageId) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: Arc<PgPool>,
}

impl PgContactStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<ContactRecord, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("contact_row", e.to_string());
    Ok(ContactRecord {
        id: MessageId::from_uuid(row.try_get("id").map_err(map)?),
        name: row.try_get("name").map_err(map)?,
        email: row.try_get("email").map_err(map)?,
        subject: row.try_get("subject").map_err(map)?,
        body: row.try_get("body").map_err(map)?,
        is_archived: row.try_get("is_archived").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
    })
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn submit(&self, record: ContactRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages
                (id, name, email, subject, body, is_archived, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.subject)
        .bind(&record.body)
        .bind(record.is_archived)
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_submit", e))?;

        Ok(())
    }

    async fn list(&self, include_archived: bool) -> Result<Vec<ContactRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, email, subject, body, is_archived, created_at \
             FROM contact_messages \
             WHERE ($1 OR NOT is_archived) \
             ORDER BY created_at DESC",
        )
        .bind(include_archived)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn archive(&self, id: MessageId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE contact_messages SET is_archived = TRUE WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("contact_archive", e))?;

        Ok(result.rows_affected() > 0)
    }
}
