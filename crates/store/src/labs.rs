//! Member laboratories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::StoreError;
use aladil_core::LabId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabRecord {
    pub id: LabId,
    pub name: String,
    pub acronym: Option<String>,
    pub city: String,
    pub country: String,
    pub director_name: Option<String>,
    pub website_url: Option<String>,
    /// Coordinates for the public map display.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabUpdate {
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub director_name: Option<String>,
    pub website_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[async_trait]
pub trait LabStore: Send + Sync {
    /// Ordered by name.
    async fn list(&self) -> Result<Vec<LabRecord>, StoreError>;
    async fn get(&self, id: LabId) -> Result<Option<LabRecord>, StoreError>;
    async fn create(&self, record: LabRecord) -> Result<(), StoreError>;
    async fn update(&self, id: LabId, changes: LabUpdate)
        -> Result<Option<LabRecord>, StoreError>;
    async fn delete(&self, id: LabId) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgLabStore {
    pool: Arc<PgPool>,
}

impl PgLabStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, name, acronym, city, country, director_name, website_url, \
                       latitude, longitude, created_at, updated_at";

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<LabRecord, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("lab_row", e.to_string());
    Ok(LabRecord {
        id: LabId::from_uuid(row.try_get("id").map_err(map)?),
        name: row.try_get("name").map_err(map)?,
        acronym: row.try_get("acronym").map_err(map)?,
        city: row.try_get("city").map_err(map)?,
        country: row.try_get("country").map_err(map)?,
        director_name: row.try_get("director_name").map_err(map)?,
        website_url: row.try_get("website_url").map_err(map)?,
        latitude: row.try_get("latitude").map_err(map)?,
        longitude: row.try_get("longitude").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}

#[async_trait]
impl LabStore for PgLabStore {
    async fn list(&self) -> Result<Vec<LabRecord>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM labs ORDER BY name ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("labs_list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: LabId) -> Result<Option<LabRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM labs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("labs_get", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn create(&self, record: LabRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO labs
                (id, name, acronym, city, country, director_name, website_url,
                 latitude, longitude, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.acronym)
        .bind(&record.city)
        .bind(&record.country)
        .bind(&record.director_name)
        .bind(&record.website_url)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("labs_create", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: LabId,
        changes: LabUpdate,
    ) -> Result<Option<LabRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE labs SET
                name = COALESCE($2, name),
                acronym = COALESCE($3, acronym),
                city = COALESCE($4, city),
                country = COALESCE($5, country),
                director_name = COALESCE($6, director_name),
                website_url = COALESCE($7, website_url),
                latitude = COALESCE($8, latitude),
                longitude = COALESCE($9, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&changes.name)
        .bind(&changes.acronym)
        .bind(&changes.city)
        .bind(&changes.country)
        .bind(&changes.director_name)
        .bind(&changes.website_url)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("labs_update", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: LabId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM labs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("labs_delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
