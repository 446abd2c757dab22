//! Intranet view over contact messages (submission is on the public
//! surface).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use aladil_auth::keys;
use aladil_core::{MessageId, ProjectKey};

use crate::app::errors;
use crate::app::routes::common::{guard, parse_id};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

#[derive(Debug, Deserialize)]
struct ListQuery {
    include_archived: Option<bool>,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/:id/archive", post(archive))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Intranet, &keys::contact::READ).await {
        return resp;
    }

    match services
        .contact
        .list(query.include_archived.unwrap_or(false))
        .await
    {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn archive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::Intranet, &keys::contact::ARCHIVE).await
    {
        return resp;
    }
    let id: MessageId = match parse_id(&id, "message") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.contact.archive(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "message not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
