//! Postgres-backed permission store.
//!
//! Two query shapes: a cheap flag read for super-admins and the admin gate,
//! and the membership join (user → active memberships in the named project
//! → role → role_permissions → permission keys) for everyone else. Both
//! read current data on every call — there is no cache to invalidate.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use aladil_auth::{MembershipGrant, Permission, PermissionStore, StoreError, UserGrants};
use aladil_core::{ProjectKey, UserId};

use crate::error::map_sqlx_error;

/// [`PermissionStore`] over a shared Postgres pool.
#[derive(Debug, Clone)]
pub struct PgPermissionStore {
    pool: Arc<PgPool>,
}

impl PgPermissionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_super_admin(&self, user_id: UserId) -> Result<Option<bool>, StoreError> {
        let row = sqlx::query("SELECT is_super_admin FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_super_admin", e))?;

        match row {
            Some(row) => {
                let flag: bool = row
                    .try_get("is_super_admin")
                    .map_err(|e| StoreError::backend("fetch_super_admin", e.to_string()))?;
                Ok(Some(flag))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    #[instrument(skip(self), fields(user_id = %user_id, project = %project))]
    async fn load_grants(
        &self,
        user_id: UserId,
        project: ProjectKey,
    ) -> Result<Option<UserGrants>, StoreError> {
        let Some(is_super_admin) = self.fetch_super_admin(user_id).await? else {
            return Ok(None);
        };

        // Super-admins resolve to the wildcard; skip the role walk entirely.
        if is_super_admin {
            return Ok(Some(UserGrants {
                is_super_admin: true,
                memberships: Vec::new(),
            }));
        }

        // The role join re-checks project scope: a membership row pointing
        // at a role from another project grants nothing here, same as the
        // in-memory store.
        let rows = sqlx::query(
            r#"
            SELECT upr.role_id, upr.is_active, perm.key AS permission_key
            FROM user_project_roles upr
            JOIN projects proj ON proj.id = upr.project_id
            JOIN roles r ON r.id = upr.role_id AND r.project_id = upr.project_id
            LEFT JOIN role_permissions rp ON rp.role_id = upr.role_id
            LEFT JOIN permissions perm ON perm.id = rp.permission_id
            WHERE upr.user_id = $1 AND proj.key = $2
            ORDER BY upr.role_id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(project.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_grants", e))?;

        // One row per (membership, permission); fold into one grant per
        // membership. The (user, project) uniqueness constraint means at
        // most one in practice.
        let mut memberships: Vec<MembershipGrant> = Vec::new();
        let mut current_role: Option<uuid::Uuid> = None;

        for row in rows {
            let role_id: uuid::Uuid = row
                .try_get("role_id")
                .map_err(|e| StoreError::backend("load_grants", e.to_string()))?;
            let is_active: bool = row
                .try_get("is_active")
                .map_err(|e| StoreError::backend("load_grants", e.to_string()))?;
            let permission_key: Option<String> = row
                .try_get("permission_key")
                .map_err(|e| StoreError::backend("load_grants", e.to_string()))?;

            if current_role != Some(role_id) {
                current_role = Some(role_id);
                memberships.push(MembershipGrant {
                    is_active,
                    permissions: Vec::new(),
                });
            }

            if let (Some(grant), Some(key)) = (memberships.last_mut(), permission_key) {
                grant.permissions.push(Permission::new(key));
            }
        }

        Ok(Some(UserGrants {
            is_super_admin: false,
            memberships,
        }))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn is_super_admin(&self, user_id: UserId) -> Result<Option<bool>, StoreError> {
        self.fetch_super_admin(user_id).await
    }
}
