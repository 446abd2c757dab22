use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    let session = user.session();
    Json(serde_json::json!({
        "user_id": session.user_id.to_string(),
        "email": session.email,
        "display_name": session.display_name,
    }))
}
