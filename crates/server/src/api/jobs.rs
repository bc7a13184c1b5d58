//! `POST /jobs_search`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use joby_compute::SearchOutcome;
use joby_core::{RawJobRecord, SearchRequest, SearchRequestBody, SourceId};

use super::{error_response, ErrorResponse};
use crate::state::AppState;

/// Wire response: `count`, one `<site>_count` per configured source, `jobs`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    #[serde(flatten)]
    pub source_counts: BTreeMap<String, usize>,
    pub jobs: Vec<RawJobRecord>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            count: outcome.total,
            source_counts: source_counts(&outcome.per_source_counts),
            jobs: outcome.jobs,
        }
    }
}

/// Every default site gets a count key, even when it was not queried.
fn source_counts(per_source: &BTreeMap<SourceId, usize>) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = SourceId::defaults()
        .iter()
        .map(|id| (id.count_key(), 0))
        .collect();
    for (id, n) in per_source {
        counts.insert(id.count_key(), *n);
    }
    counts
}

pub async fn jobs_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequestBody>, JsonRejection>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected malformed search body");
        error_response(rejection.status(), rejection.body_text())
    })?;

    let request = SearchRequest::try_from(body).map_err(|e| {
        warn!(error = %e, "rejected invalid search request");
        error_response(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let outcome = state.engine.search(&request).await;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_flattens_source_counts() {
        let outcome = SearchOutcome {
            total: 1,
            per_source_counts: BTreeMap::from([(SourceId::Indeed, 1), (SourceId::LinkedIn, 0)]),
            jobs: vec![RawJobRecord {
                title: Some("Dev".into()),
                ..Default::default()
            }],
        };
        let json = serde_json::to_value(SearchResponse::from(outcome)).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["indeed_count"], 1);
        assert_eq!(json["linkedin_count"], 0);
        assert_eq!(json["jobs"][0]["title"], "Dev");
    }

    #[test]
    fn empty_outcome_serializes_zero_counts() {
        let outcome = SearchOutcome::empty(&[SourceId::Indeed, SourceId::LinkedIn]);
        let json = serde_json::to_value(SearchResponse::from(outcome)).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["jobs"], serde_json::json!([]));
        assert_eq!(json["indeed_count"], 0);
    }

    #[test]
    fn single_site_outcome_still_reports_every_count_key() {
        let outcome = SearchOutcome::empty(&[SourceId::Indeed]);
        let json = serde_json::to_value(SearchResponse::from(outcome)).unwrap();
        assert_eq!(json["indeed_count"], 0);
        assert_eq!(json["linkedin_count"], 0);
    }
}
