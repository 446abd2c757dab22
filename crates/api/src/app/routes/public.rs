//! Public surface: no session required, read-only except the contact form.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use aladil_core::MessageId;
use aladil_store::ContactRecord;

use crate::app::dto::ContactSubmission;
use crate::app::errors;
use crate::app::routes::common::require_nonempty;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/news", get(list_news))
        .route("/news/:slug", get(get_news))
        .route("/meetings", get(list_meetings))
        .route("/labs", get(list_labs))
        .route("/executive", get(list_executive))
        .route("/contact", post(submit_contact))
}

async fn list_news(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.news.list(false).await {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_news(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.news.get_by_slug(&slug).await {
        // Unpublished drafts are invisible here, whatever the slug.
        Ok(Some(post)) if post.is_published => (StatusCode::OK, Json(post)).into_response(),
        Ok(_) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "news post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn list_meetings(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.meetings.list().await {
        Ok(meetings) => (StatusCode::OK, Json(meetings)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn list_labs(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.labs.list().await {
        Ok(labs) => (StatusCode::OK, Json(labs)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn list_executive(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.executive.list().await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn submit_contact(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ContactSubmission>,
) -> axum::response::Response {
    for (value, field) in [
        (&body.name, "name"),
        (&body.email, "email"),
        (&body.subject, "subject"),
        (&body.body, "body"),
    ] {
        if let Err(resp) = require_nonempty(value, field) {
            return resp;
        }
    }
    if !body.email.contains('@') {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email must be a valid address",
        );
    }

    let record = ContactRecord {
        id: MessageId::new(),
        name: body.name,
        email: body.email,
        subject: body.subject,
        body: body.body,
        is_archived: false,
        created_at: Utc::now(),
    };
    let id = record.id;

    match services.contact.submit(record).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
