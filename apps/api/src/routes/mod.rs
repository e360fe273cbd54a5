pub mod health;

use axum::{routing::get, Router};

use crate::ingest::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume ingestion
        .route(
            "/api/v1/resume/upload",
            get(handlers::handle_capabilities).post(handlers::handle_upload),
        )
        .route("/api/v1/resume", get(handlers::handle_get_resume))
        .with_state(state)
}
