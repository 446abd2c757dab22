//! User administration. Mounted behind the super-admin gate, so handlers
//! here never re-check permissions themselves.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use aladil_core::{RoleId, UserId};
use aladil_store::{UserAccount, UserUpdate};

use crate::app::dto::{AssignMembershipRequest, CreateUserRequest, SetMembershipActiveRequest};
use crate::app::errors;
use crate::app::routes::common::{parse_id, parse_project, require_nonempty};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route(
            "/:id/memberships",
            get(list_memberships)
                .put(assign_membership)
                .patch(set_membership_active),
        )
}

async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.users.list().await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.get(id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateUserRequest>,
) -> axum::response::Response {
    for (value, field) in [(&body.email, "email"), (&body.display_name, "display_name")] {
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

    match services.users.find_by_email(&body.email).await {
        Ok(Some(_)) => {
            return errors::json_error(StatusCode::CONFLICT, "conflict", "email already in use")
        }
        Ok(None) => {}
        Err(e) => return errors::store_error_to_response(e),
    }

    let account = UserAccount {
        id: UserId::new(),
        email: body.email,
        display_name: body.display_name,
        is_active: true,
        is_super_admin: body.is_super_admin.unwrap_or(false),
        created_at: Utc::now(),
    };

    match services.users.create(account.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(changes): Json<UserUpdate>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Some(email) = &changes.email {
        match services.users.find_by_email(email).await {
            Ok(Some(other)) if other.id != id => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "conflict",
                    "email already in use",
                )
            }
            Ok(_) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    match services.users.update(id, changes).await {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn list_memberships(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.roles.list_memberships(id).await {
        Ok(memberships) => (StatusCode::OK, Json(memberships)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn assign_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<AssignMembershipRequest>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match parse_project(&body.project) {
        Ok(project) => project,
        Err(resp) => return resp,
    };
    let role_id: RoleId = match parse_id(&body.role_id, "role") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.get(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    // The role must exist and be scoped to the membership's project.
    match services.roles.get_role(role_id).await {
        Ok(Some(role)) if role.project == project => {}
        Ok(Some(role)) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("role '{}' is scoped to {}, not {project}", role.key, role.project),
            )
        }
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    match services
        .roles
        .assign_membership(user_id, project, role_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn set_membership_active(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<SetMembershipActiveRequest>,
) -> axum::response::Response {
    let user_id: UserId = match parse_id(&id, "user") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let project = match parse_project(&body.project) {
        Ok(project) => project,
        Err(resp) => return resp,
    };

    match services
        .roles
        .set_membership_active(user_id, project, body.is_active)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "membership not found")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
