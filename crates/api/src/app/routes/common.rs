use core::str::FromStr;

use axum::http::StatusCode;

use aladil_auth::{require_permission, Permission};
use aladil_core::ProjectKey;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Per-operation permission guard, invoked at the top of every guarded
/// handler before any existence check or store read.
///
/// On denial the caller returns the ready-made response, so a failed check
/// can never fall through into the operation.
pub async fn guard(
    services: &AppServices,
    user: &CurrentUser,
    project: ProjectKey,
    permission: &Permission,
) -> Result<(), axum::response::Response> {
    require_permission(
        &*services.permissions,
        Some(user.user_id()),
        project,
        permission,
    )
    .await
    .map_err(errors::access_error_to_response)
}

/// Parse a path identifier, mapping failure to a 400.
pub fn parse_id<T: FromStr>(raw: &str, what: &'static str) -> Result<T, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {what} id"),
        )
    })
}

/// Parse a project key from a request body, mapping failure to a 400.
pub fn parse_project(raw: &str) -> Result<ProjectKey, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unknown project key: {raw}"),
        )
    })
}

/// Reject blank required fields.
pub fn require_nonempty(
    value: &str,
    field: &'static str,
) -> Result<(), axum::response::Response> {
    if value.trim().is_empty() {
        Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{field} must not be empty"),
        ))
    } else {
        Ok(())
    }
}
