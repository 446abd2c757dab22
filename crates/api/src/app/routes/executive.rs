use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use aladil_auth::keys;
use aladil_core::{MemberId, ProjectKey};
use aladil_store::{MemberRecord, MemberUpdate};

use crate::app::dto::CreateMemberRequest;
use crate::app::errors;
use crate::app::routes::common::{guard, parse_id, require_nonempty};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::ExecCommittee, &keys::executive::READ).await
    {
        return resp;
    }

    match services.executive.list().await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::ExecCommittee, &keys::executive::READ).await
    {
        return resp;
    }
    let id: MemberId = match parse_id(&id, "member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.executive.get(id).await {
        Ok(Some(member)) => (StatusCode::OK, Json(member)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "member not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateMemberRequest>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::ExecCommittee, &keys::executive::CREATE).await
    {
        return resp;
    }
    for (value, field) in [(&body.full_name, "full_name"), (&body.position, "position")] {
        if let Err(resp) = require_nonempty(value, field) {
            return resp;
        }
    }

    let now = Utc::now();
    let record = MemberRecord {
        id: MemberId::new(),
        full_name: body.full_name,
        position: body.position,
        photo_url: body.photo_url,
        display_order: body.display_order.unwrap_or(0),
        created_at: now,
        updated_at: now,
    };

    match services.executive.create(record.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(changes): Json<MemberUpdate>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::ExecCommittee, &keys::executive::UPDATE).await
    {
        return resp;
    }
    let id: MemberId = match parse_id(&id, "member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.executive.update(id, changes).await {
        Ok(Some(member)) => (StatusCode::OK, Json(member)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "member not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::ExecCommittee, &keys::executive::DELETE).await
    {
        return resp;
    }
    let id: MemberId = match parse_id(&id, "member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.executive.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "member not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
