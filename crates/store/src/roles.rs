//! Roles and memberships (role administration surface).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use aladil_auth::{Permission, StoreError};
use aladil_core::{ProjectKey, RoleId, UserId};

use crate::error::map_sqlx_error;

/// A role with its attached permission keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub project: ProjectKey,
    /// Unique within the project.
    pub key: String,
    pub name: String,
    /// Protected from deletion/rename by the tooling, not by the resolver.
    pub is_system: bool,
    pub permissions: Vec<Permission>,
}

/// A user's role assignment within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub user_id: UserId,
    pub project: ProjectKey,
    pub role_id: RoleId,
    pub is_active: bool,
}

#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn list_roles(&self, project: Option<ProjectKey>)
        -> Result<Vec<RoleRecord>, StoreError>;
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError>;
    async fn create_role(&self, role: RoleRecord) -> Result<(), StoreError>;
    /// Replace the role's permission set wholesale.
    async fn set_role_permissions(
        &self,
        id: RoleId,
        permissions: Vec<Permission>,
    ) -> Result<bool, StoreError>;
    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError>;

    /// Upsert the user's single role within a project (active).
    async fn assign_membership(
        &self,
        user_id: UserId,
        project: ProjectKey,
        role_id: RoleId,
    ) -> Result<(), StoreError>;
    async fn set_membership_active(
        &self,
        user_id: UserId,
        project: ProjectKey,
        is_active: bool,
    ) -> Result<bool, StoreError>;
    async fn list_memberships(&self, user_id: UserId)
        -> Result<Vec<MembershipRecord>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgRoleDirectory {
    pool: Arc<PgPool>,
}

impl PgRoleDirectory {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn parse_project(raw: &str) -> Result<ProjectKey, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::backend("parse_project", format!("{e}")))
}

/// Fold `(role columns, permission_key)` rows into one record per role.
/// Rows must arrive ordered by role id.
fn fold_role_rows(rows: &[sqlx::postgres::PgRow]) -> Result<Vec<RoleRecord>, StoreError> {
    let map = |e: sqlx::Error| StoreError::backend("role_row", e.to_string());

    let mut roles: Vec<RoleRecord> = Vec::new();
    for row in rows {
        let id: uuid::Uuid = row.try_get("id").map_err(map)?;
        let id = RoleId::from_uuid(id);

        if roles.last().map(|r| r.id) != Some(id) {
            let project: String = row.try_get("project_key").map_err(map)?;
            roles.push(RoleRecord {
                id,
                project: parse_project(&project)?,
                key: row.try_get("key").map_err(map)?,
                name: row.try_get("name").map_err(map)?,
                is_system: row.try_get("is_system").map_err(map)?,
                permissions: Vec::new(),
            });
        }

        let permission_key: Option<String> = row.try_get("permission_key").map_err(map)?;
        if let (Some(role), Some(key)) = (roles.last_mut(), permission_key) {
            role.permissions.push(Permission::new(key));
        }
    }

    Ok(roles)
}

const ROLE_SELECT: &str = r#"
    SELECT r.id, proj.key AS project_key, r.key, r.name, r.is_system,
           perm.key AS permission_key
    FROM roles r
    JOIN projects proj ON proj.id = r.project_id
    LEFT JOIN role_permissions rp ON rp.role_id = r.id
    LEFT JOIN permissions perm ON perm.id = rp.permission_id
"#;

#[async_trait]
impl RoleDirectory for PgRoleDirectory {
    async fn list_roles(
        &self,
        project: Option<ProjectKey>,
    ) -> Result<Vec<RoleRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{ROLE_SELECT} WHERE ($1::text IS NULL OR proj.key = $1) ORDER BY r.id"
        ))
        .bind(project.map(|p| p.as_str()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("roles_list", e))?;

        fold_role_rows(&rows)
    }

    async fn get_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        let rows = sqlx::query(&format!("{ROLE_SELECT} WHERE r.id = $1 ORDER BY r.id"))
            .bind(id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("roles_get", e))?;

        Ok(fold_role_rows(&rows)?.into_iter().next())
    }

    async fn create_role(&self, role: RoleRecord) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("roles_create", e))?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, project_id, key, name, is_system)
            SELECT $1, proj.id, $3, $4, $5 FROM projects proj WHERE proj.key = $2
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.project.as_str())
        .bind(&role.key)
        .bind(&role.name)
        .bind(role.is_system)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("roles_create", e))?;

        for permission in &role.permissions {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, perm.id FROM permissions perm WHERE perm.key = $2
                "#,
            )
            .bind(role.id.as_uuid())
            .bind(permission.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("roles_create", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("roles_create", e))?;

        Ok(())
    }

    async fn set_role_permissions(
        &self,
        id: RoleId,
        permissions: Vec<Permission>,
    ) -> Result<bool, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("roles_set_permissions", e))?;

        let exists = sqlx::query("SELECT 1 FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("roles_set_permissions", e))?
            .is_some();

        if !exists {
            return Ok(false);
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("roles_set_permissions", e))?;

        for permission in &permissions {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, perm.id FROM permissions perm WHERE perm.key = $2
                "#,
            )
            .bind(id.as_uuid())
            .bind(permission.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("roles_set_permissions", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("roles_set_permissions", e))?;

        Ok(true)
    }

    async fn delete_role(&self, id: RoleId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("roles_delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_membership(
        &self,
        user_id: UserId,
        project: ProjectKey,
        role_id: RoleId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_project_roles (user_id, project_id, role_id, is_active)
            SELECT $1, proj.id, $3, TRUE FROM projects proj WHERE proj.key = $2
            ON CONFLICT (user_id, project_id)
            DO UPDATE SET role_id = EXCLUDED.role_id, is_active = TRUE
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(project.as_str())
        .bind(role_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("membership_assign", e))?;

        Ok(())
    }

    async fn set_membership_active(
        &self,
        user_id: UserId,
        project: ProjectKey,
        is_active: bool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_project_roles upr SET is_active = $3
            FROM projects proj
            WHERE upr.user_id = $1 AND proj.key = $2 AND upr.project_id = proj.id
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(project.as_str())
        .bind(is_active)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("membership_set_active", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_memberships(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MembershipRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT upr.user_id, proj.key AS project_key, upr.role_id, upr.is_active
            FROM user_project_roles upr
            JOIN projects proj ON proj.id = upr.project_id
            WHERE upr.user_id = $1
            ORDER BY proj.key
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("memberships_list", e))?;

        let map = |e: sqlx::Error| StoreError::backend("membership_row", e.to_string());
        rows.iter()
            .map(|row| {
                let project: String = row.try_get("project_key").map_err(map)?;
                Ok(MembershipRecord {
                    user_id: UserId::from_uuid(row.try_get("user_id").map_err(map)?),
                    project: parse_project(&project)?,
                    role_id: RoleId::from_uuid(row.try_get("role_id").map_err(map)?),
                    is_active: row.try_get("is_active").map_err(map)?,
                })
            })
            .collect()
    }
}
