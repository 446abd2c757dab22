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
use aladil_core::{LabId, ProjectKey};
use aladil_store::{LabRecord, LabUpdate};

use crate::app::dto::CreateLabRequest;
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
    if let Err(resp) = guard(&services, &user, ProjectKey::Labs, &keys::labs::READ).await {
        return resp;
    }

    match services.labs.list().await {
        Ok(labs) => (StatusCode::OK, Json(labs)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Labs, &keys::labs::READ).await {
        return resp;
    }
    let id: LabId = match parse_id(&id, "lab") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.labs.get(id).await {
        Ok(Some(lab)) => (StatusCode::OK, Json(lab)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "lab not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateLabRequest>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Labs, &keys::labs::CREATE).await {
        return resp;
    }
    for (value, field) in [
        (&body.name, "name"),
        (&body.city, "city"),
        (&body.country, "country"),
    ] {
        if let Err(resp) = require_nonempty(value, field) {
            return resp;
        }
    }

    let now = Utc::now();
    let record = LabRecord {
        id: LabId::new(),
        name: body.name,
        acronym: body.acronym,
        city: body.city,
        country: body.country,
        director_name: body.director_name,
        website_url: body.website_url,
        latitude: body.latitude,
        longitude: body.longitude,
        created_at: now,
        updated_at: now,
    };

    match services.labs.create(record.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(changes): Json<LabUpdate>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Labs, &keys::labs::UPDATE).await {
        return resp;
    }
    let id: LabId = match parse_id(&id, "lab") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.labs.update(id, changes).await {
        Ok(Some(lab)) => (StatusCode::OK, Json(lab)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "lab not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = guard(&services, &user, ProjectKey::Labs, &keys::labs::DELETE).await {
        return resp;
    }
    let id: LabId = match parse_id(&id, "lab") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.labs.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "lab not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
