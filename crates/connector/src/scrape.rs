//! HTTP client for the external scrape service and the adapter built on it.
//!
//! The service takes a `SourceQuery` as JSON on `POST /scrape` and answers
//! with either a bare array of rows or `{"jobs": [...]}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use joby_core::config::ScraperConfig;
use joby_core::{RawJobRecord, SourceId};

use crate::source::{JobSource, SourceError, SourceQuery};

pub struct ScrapeClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScrapeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self, SourceError> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub async fn scrape(&self, query: &SourceQuery) -> Result<Vec<RawJobRecord>, SourceError> {
        let url = format!("{}/scrape", self.base_url);
        debug!(site = %query.site_name, term = %query.search_term, "scrape request to {}", url);

        let response = self.client.post(&url).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let rows = match body {
            Value::Array(rows) => rows,
            Value::Object(mut map) => match map.remove("jobs") {
                Some(Value::Array(rows)) => rows,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(SourceError::Decode(format!(
                        "'jobs' is not an array: {other}"
                    )))
                }
            },
            other => {
                return Err(SourceError::Decode(format!(
                    "expected array or object, got {other}"
                )))
            }
        };

        let total = rows.len();
        let records: Vec<RawJobRecord> = rows
            .into_iter()
            .filter_map(RawJobRecord::from_json)
            .map(|mut record| {
                if record.site.is_none() {
                    record.site = Some(query.site_name.as_str().to_string());
                }
                record
            })
            .collect();

        if records.len() < total {
            debug!(
                site = %query.site_name,
                skipped = total - records.len(),
                "skipped non-object rows"
            );
        }

        Ok(records)
    }
}

/// A job board reached through the shared scrape service.
pub struct HttpSource {
    id: SourceId,
    client: Arc<ScrapeClient>,
}

impl HttpSource {
    pub fn new(id: SourceId, client: Arc<ScrapeClient>) -> Self {
        Self { id, client }
    }
}

#[async_trait]
impl JobSource for HttpSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawJobRecord>, SourceError> {
        self.client.scrape(query).await
    }
}

/// One adapter per configured source, all sharing a single HTTP client.
pub fn build_sources(
    sources: &[SourceId],
    scraper: &ScraperConfig,
) -> Result<Vec<Arc<dyn JobSource>>, SourceError> {
    let client = Arc::new(ScrapeClient::from_config(scraper)?);
    Ok(sources
        .iter()
        .map(|id| Arc::new(HttpSource::new(*id, client.clone())) as Arc<dyn JobSource>)
        .collect())
}
