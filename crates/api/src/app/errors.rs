use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use aladil_auth::{AccessError, StoreError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map an authorization failure to its transport shape.
///
/// Forbidden responses name the single denied key, never the caller's full
/// permission set.
pub fn access_error_to_response(err: AccessError) -> axum::response::Response {
    match err {
        AccessError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        AccessError::Forbidden(permission) => (
            StatusCode::FORBIDDEN,
            axum::Json(json!({
                "error": "forbidden",
                "message": format!("missing permission '{permission}'"),
                "permission": permission.as_str(),
            })),
        )
            .into_response(),
        AccessError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!("store failure: {err}");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "storage backend failure",
    )
}
