use axum::{routing::get, Router};

pub mod common;
pub mod contact;
pub mod executive;
pub mod labs;
pub mod meetings;
pub mod news;
pub mod public;
pub mod rbac;
pub mod system;
pub mod users;

/// Router for all authenticated (permission-guarded) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/news", news::router())
        .nest("/meetings", meetings::router())
        .nest("/labs", labs::router())
        .nest("/executive", executive::router())
        .nest("/contact", contact::router())
        .nest("/rbac", rbac::router())
}
