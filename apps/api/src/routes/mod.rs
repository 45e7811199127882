pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking API
        .route("/api/v1/rankings", post(handlers::handle_create_ranking))
        .route(
            "/api/v1/rankings/:session_id",
            get(handlers::handle_get_ranking),
        )
        .route(
            "/api/v1/rankings/:session_id/export",
            get(handlers::handle_export_ranking),
        )
        .route("/api/v1/export/latest", get(handlers::handle_export_latest))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
