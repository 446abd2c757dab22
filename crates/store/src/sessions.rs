//! Postgres-backed session resolution.
//!
//! Sessions are written by the upstream auth service; this side only reads
//! them. A token resolves to nothing when it is unknown, expired, or its
//! user has been deactivated.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use aladil_auth::{Session, SessionProvider, StoreError};
use aladil_core::UserId;

use crate::error::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PgSessions {
    pool: Arc<PgPool>,
}

impl PgSessions {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionProvider for PgSessions {
    #[instrument(skip(self, token))]
    async fn resolve(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.email, u.display_name
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
              AND s.expires_at > NOW()
              AND u.is_active
            "#,
        )
        .bind(token)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("resolve_session", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: uuid::Uuid = row
            .try_get("user_id")
            .map_err(|e| StoreError::backend("resolve_session", e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| StoreError::backend("resolve_session", e.to_string()))?;
        let display_name: String = row
            .try_get("display_name")
            .map_err(|e| StoreError::backend("resolve_session", e.to_string()))?;

        Ok(Some(Session {
            user_id: UserId::from_uuid(user_id),
            email,
            display_name,
        }))
    }
}
