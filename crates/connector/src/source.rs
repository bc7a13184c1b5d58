//! Source adapter trait and the query each adapter sends out.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use joby_core::{RawJobRecord, SearchRequest, SourceId};

use crate::mapping;

/// Errors a single source can produce. None of them reach the HTTP caller.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scrape service error: {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode scrape response: {0}")]
    Decode(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("source task aborted: {0}")]
    Aborted(String),
}

/// Parameters for one scrape call, in the scrape service's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceQuery {
    pub site_name: SourceId,
    pub search_term: String,
    pub location: String,
    pub distance: u32,
    pub job_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
    #[serde(default)]
    pub linkedin_fetch_description: bool,
}

/// One external job board.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Derive this board's query from a validated search.
    fn query_for(&self, request: &SearchRequest, results_wanted: u32) -> SourceQuery {
        mapping::query_for(self.id(), request, results_wanted)
    }

    /// Run the scrape. Implementations must not retry.
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawJobRecord>, SourceError>;
}
