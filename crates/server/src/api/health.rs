//! Liveness endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub sources: Vec<&'static str>,
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Jobs search API is running",
        sources: state.engine.source_ids().iter().map(|s| s.as_str()).collect(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub profile: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        profile: state.config.profile_label().to_string(),
    })
}
