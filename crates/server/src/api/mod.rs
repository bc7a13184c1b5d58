//! HTTP endpoint handlers.
//!
//! Shared error body lives here; each sub-module owns one area.

mod health;
mod jobs;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub use health::{health, root};
pub use jobs::{jobs_search, SearchResponse};
