//! Replays an alert against the search API.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};

use joby_core::config::NotifyConfig;
use joby_core::RawJobRecord;

use crate::alert::JobAlert;
use crate::traits::NotifyError;

/// Anything that can produce the current postings for an alert.
#[async_trait::async_trait]
pub trait JobFeed: Send + Sync {
    /// Current postings for the alert. Failures are logged and read as empty.
    async fn jobs_for(&self, alert: &JobAlert) -> Vec<RawJobRecord>;
}

#[derive(Deserialize)]
struct SearchReply {
    #[serde(default)]
    jobs: Vec<RawJobRecord>,
}

/// HTTP client for `POST {base_url}/jobs_search`.
pub struct JobsClient {
    client: reqwest::Client,
    base_url: String,
}

impl JobsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        Self::new(
            &config.jobs_server_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// One search call. Non-2xx statuses are errors.
    pub async fn search(&self, alert: &JobAlert) -> Result<Vec<RawJobRecord>, NotifyError> {
        let url = format!("{}/jobs_search", self.base_url);
        let reply: SearchReply = self
            .client
            .post(&url)
            .json(&alert.search_body())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.jobs)
    }
}

#[async_trait::async_trait]
impl JobFeed for JobsClient {
    async fn jobs_for(&self, alert: &JobAlert) -> Vec<RawJobRecord> {
        match self.search(alert).await {
            Ok(jobs) => {
                debug!(alert_id = %alert.id, count = jobs.len(), "fetched jobs for alert");
                jobs
            }
            Err(e) => {
                error!(alert_id = %alert.id, error = %e, "error fetching jobs");
                Vec::new()
            }
        }
    }
}
