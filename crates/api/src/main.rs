use std::sync::Arc;

use sqlx::PgPool;

use aladil_api::app::{build_app, services::AppServices};

#[tokio::main]
async fn main() {
    aladil_observability::init();

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPool::connect(&url)
                .await
                .expect("failed to connect to Postgres");
            AppServices::postgres(pool)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is not persisted)");
            AppServices::in_memory().0
        }
    };

    let app = build_app(Arc::new(services));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
