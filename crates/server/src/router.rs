//! HTTP router construction.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/jobs_search", post(api::jobs_search))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::permissive().allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            warn!(origin, error = %e, "invalid CORS_ORIGIN, falling back to permissive");
            CorsLayer::permissive()
        }
    }
}
