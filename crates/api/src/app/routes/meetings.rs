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
use aladil_core::{MeetingId, ProjectKey};
use aladil_store::{MeetingRecord, MeetingUpdate};

use crate::app::dto::CreateMeetingRequest;
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
    if let Err(resp) = guard(&services, &user, ProjectKey::Meetings, &keys::meetings::READ).await {
        return resp;
    }

    match services.meetings.list().await {
        Ok(meetings) => (StatusCode::OK, Json(meetings)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Meetings, &keys::meetings::READ).await {
        return resp;
    }
    let id: MeetingId = match parse_id(&id, "meeting") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.meetings.get(id).await {
        Ok(Some(meeting)) => (StatusCode::OK, Json(meeting)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "meeting not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateMeetingRequest>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::Meetings, &keys::meetings::CREATE).await
    {
        return resp;
    }
    if let Err(resp) = require_nonempty(&body.title, "title") {
        return resp;
    }
    if body.ends_at.is_some_and(|end| end <= body.starts_at) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "ends_at must be after starts_at",
        );
    }

    let now = Utc::now();
    let record = MeetingRecord {
        id: MeetingId::new(),
        title: body.title,
        description: body.description,
        location: body.location,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        created_at: now,
        updated_at: now,
    };

    match services.meetings.create(record.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(changes): Json<MeetingUpdate>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::Meetings, &keys::meetings::UPDATE).await
    {
        return resp;
    }
    let id: MeetingId = match parse_id(&id, "meeting") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // Check the schedule as it would be after the patch, not just the
    // fields the caller sent.
    let existing = match services.meetings.get(id).await {
        Ok(Some(meeting)) => meeting,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "meeting not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    };
    let starts_at = changes.starts_at.unwrap_or(existing.starts_at);
    let ends_at = changes.ends_at.or(existing.ends_at);
    if ends_at.is_some_and(|end| end <= starts_at) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "ends_at must be after starts_at",
        );
    }

    match services.meetings.update(id, changes).await {
        Ok(Some(meeting)) => (StatusCode::OK, Json(meeting)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "meeting not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) =
        guard(&services, &user, ProjectKey::Meetings, &keys::meetings::DELETE).await
    {
        return resp;
    }
    let id: MeetingId = match parse_id(&id, "meeting") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.meetings.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "meeting not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
