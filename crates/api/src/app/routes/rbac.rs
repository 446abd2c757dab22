//! Role administration: roles, their permission sets, and the key catalog.
//!
//! Everything here is guarded by `roles.manage` in the SETTINGS scope.
//! Membership assignment lives on the admin user surface instead.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use aladil_auth::{keys, Permission};
use aladil_core::{ProjectKey, RoleId};
use aladil_store::RoleRecord;

use crate::app::dto::{CreateRoleRequest, SetRolePermissionsRequest};
use crate::app::errors;
use crate::app::routes::common::{guard, parse_id, parse_project, require_nonempty};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

#[derive(Debug, Deserialize)]
struct ListQuery {
    project: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", get(get_role).delete(delete_role))
        .route("/roles/:id/permissions", put(set_role_permissions))
        .route("/permissions", get(list_permissions))
}

/// Resolve permission keys against the catalog, rejecting unknown keys and
/// keys scoped to a different project than the role's.
fn resolve_keys(
    project: ProjectKey,
    raw: &[String],
) -> Result<Vec<Permission>, axum::response::Response> {
    raw.iter()
        .map(|key| {
            match keys::catalog().iter().find(|(_, p)| p.as_str() == key) {
                Some((scope, permission)) if *scope == project => Ok(permission.clone()),
                Some(_) => Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("permission '{key}' is not scoped to {project}"),
                )),
                None => Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("unknown permission key: {key}"),
                )),
            }
        })
        .collect()
}

async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }
    let project = match query.project.as_deref().map(parse_project).transpose() {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    match services.roles.list_roles(project).await {
        Ok(roles) => (StatusCode::OK, Json(roles)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }
    let id: RoleId = match parse_id(&id, "role") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.roles.get_role(id).await {
        Ok(Some(role)) => (StatusCode::OK, Json(role)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }
    let project = match parse_project(&body.project) {
        Ok(project) => project,
        Err(resp) => return resp,
    };
    for (value, field) in [(&body.key, "key"), (&body.name, "name")] {
        if let Err(resp) = require_nonempty(value, field) {
            return resp;
        }
    }
    let permissions = match resolve_keys(project, &body.permissions) {
        Ok(permissions) => permissions,
        Err(resp) => return resp,
    };

    let existing = match services.roles.list_roles(Some(project)).await {
        Ok(roles) => roles,
        Err(e) => return errors::store_error_to_response(e),
    };
    if existing.iter().any(|r| r.key == body.key) {
        return errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("role key '{}' already exists in {project}", body.key),
        );
    }

    let record = RoleRecord {
        id: RoleId::new(),
        project,
        key: body.key,
        name: body.name,
        is_system: false,
        permissions,
    };

    match services.roles.create_role(record.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn set_role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<SetRolePermissionsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }
    let id: RoleId = match parse_id(&id, "role") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let role = match services.roles.get_role(id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    let permissions = match resolve_keys(role.project, &body.permissions) {
        Ok(permissions) => permissions,
        Err(resp) => return resp,
    };

    match services.roles.set_role_permissions(id, permissions).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }
    let id: RoleId = match parse_id(&id, "role") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.roles.get_role(id).await {
        Ok(Some(role)) if role.is_system => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "system roles cannot be deleted",
            )
        }
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    match services.roles.delete_role(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Settings, &keys::roles::MANAGE).await {
        return resp;
    }

    let permissions: Vec<_> = keys::catalog()
        .iter()
        .map(|(project, permission)| {
            serde_json::json!({
                "project": project.as_str(),
                "key": permission.as_str(),
            })
        })
        .collect();

    (StatusCode::OK, Json(permissions)).into_response()
}
