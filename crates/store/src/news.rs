//! News posts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::NewsId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: NewsId,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub cover_image_url: Option<String>,
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Newest first. `include_unpublished` is false on the public surface.
    async fn list(&self, include_unpublished: bool) -> Result<Vec<NewsRecord>, StoreError>;
    async fn get(&self, id: NewsId) -> Result<Option<NewsRecord>, StoreError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<NewsRecord>, StoreError>;
    async fn create(&self, record: NewsRecord) -> Result<(), StoreError>;
    async fn update(&self, id: NewsId, changes: NewsUpdate)
        -> Result<Option<NewsRecord>, StoreError>;
    async fn delete(&self, id: NewsId) -> Result<bool, StoreError>;
    async fn set_published(
        &self,
        id: NewsId,
        published: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<NewsRecord>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgNewsStore {
    pool: Arc<PgPool>,
}

impl PgNewsStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, title, slug, summary, body, cover_image_url, \
                       is_published, published_at, created_at, updated_at";

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<NewsRecord, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("news_row", e.to_string());
    Ok(NewsRecord {
        id: NewsId::from_uuid(row.try_get("id").map_err(map)?),
        title: row.try_get("title").map_err(map)?,
        slug: row.try_get("slug").map_err(map)?,
        summary: row.try_get("summary").map_err(map)?,
        body: row.try_get("body").map_err(map)?,
        cover_image_url: row.try_get("cover_image_url").map_err(map)?,
        is_published: row.try_get("is_published").map_err(map)?,
        published_at: row.try_get("published_at").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn list(&self, include_unpublished: bool) -> Result<Vec<NewsRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM news_posts \
             WHERE ($1 OR is_published) \
             ORDER BY created_at DESC"
        ))
        .bind(include_unpublished)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("news_list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: NewsId) -> Result<Option<NewsRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM news_posts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("news_get", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<NewsRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM news_posts WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("news_get_by_slug", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn create(&self, record: NewsRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO news_posts
                (id, title, slug, summary, body, cover_image_url,
                 is_published, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.summary)
        .bind(&record.body)
        .bind(&record.cover_image_url)
        .bind(record.is_published)
        .bind(record.published_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("news_create", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: NewsId,
        changes: NewsUpdate,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE news_posts SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                summary = COALESCE($4, summary),
                body = COALESCE($5, body),
                cover_image_url = COALESCE($6, cover_image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.summary)
        .bind(&changes.body)
        .bind(&changes.cover_image_url)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("news_update", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: NewsId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM news_posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("news_delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_published(
        &self,
        id: NewsId,
        published: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE news_posts SET
                is_published = $2,
                published_at = CASE WHEN $2 THEN $3 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(published)
        .bind(at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("news_set_published", e))?;

        row.as_ref().map(record_from_row).transpose()
    }
}
