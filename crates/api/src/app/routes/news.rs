//! News management (drafts included). The public read path lives in
//! `public.rs`.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use aladil_auth::keys;
use aladil_core::{slugify, NewsId, ProjectKey};
use aladil_store::{NewsRecord, NewsUpdate};

use crate::app::dto::CreateNewsRequest;
use crate::app::errors;
use crate::app::routes::common::{guard, parse_id, require_nonempty};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/publish", post(publish))
        .route("/:id/unpublish", post(unpublish))
}

async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::READ).await {
        return resp;
    }

    match services.news.list(true).await {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::READ).await {
        return resp;
    }
    let id: NewsId = match parse_id(&id, "news") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.news.get(id).await {
        Ok(Some(post)) => (StatusCode::OK, Json(post)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "news post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateNewsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::CREATE).await {
        return resp;
    }
    if let Err(resp) = require_nonempty(&body.title, "title") {
        return resp;
    }

    let slug = body.slug.unwrap_or_else(|| slugify(&body.title));
    if slug.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "slug must not be empty",
        );
    }

    match services.news.get_by_slug(&slug).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::CONFLICT, "conflict", "slug already in use")
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let now = Utc::now();
    let record = NewsRecord {
        id: NewsId::new(),
        title: body.title,
        slug,
        summary: body.summary,
        body: body.body,
        cover_image_url: body.cover_image_url,
        is_published: false,
        published_at: None,
        created_at: now,
        updated_at: now,
    };

    match services.news.create(record.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(changes): Json<NewsUpdate>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::UPDATE).await {
        return resp;
    }
    let id: NewsId = match parse_id(&id, "news") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Some(slug) = &changes.slug {
        if slug.is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "slug must not be empty",
            );
        }
        match services.news.get_by_slug(slug).await {
            Ok(Some(other)) if other.id != id => {
                return errors::json_error(StatusCode::CONFLICT, "conflict", "slug already in use")
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    match services.news.update(id, changes).await {
        Ok(Some(post)) => (StatusCode::OK, Json(post)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "news post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::DELETE).await {
        return resp;
    }
    let id: NewsId = match parse_id(&id, "news") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.news.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "news post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn publish(
    services: Extension<Arc<AppServices>>,
    user: Extension<CurrentUser>,
    id: Path<String>,
) -> axum::response::Response {
    set_published(services, user, id, true).await
}

async fn unpublish(
    services: Extension<Arc<AppServices>>,
    user: Extension<CurrentUser>,
    id: Path<String>,
) -> axum::response::Response {
    set_published(services, user, id, false).await
}

async fn set_published(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    published: bool,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::News, &keys::news::PUBLISH).await {
        return resp;
    }
    let id: NewsId = match parse_id(&id, "news") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.news.set_published(id, published, Utc::now()).await {
        Ok(Some(post)) => (StatusCode::OK, Json(post)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "news post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
