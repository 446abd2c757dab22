//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store wiring (Postgres or in-memory)
//! - `routes/`: HTTP routes + handlers (one file per feature area)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// integration tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
        permissions: services.permissions.clone(),
    };

    // Admin surface: authenticated AND super-admin, checked per request.
    let admin = Router::new()
        .nest("/admin/users", routes::users::router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::require_admin,
        ));

    // Everything behind the authentication gate.
    let protected = routes::router()
        .merge(admin)
        .layer(axum::middleware::from_fn(middleware::require_auth));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/public", routes::public::router())
        .merge(protected)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_middleware,
        ))
}
