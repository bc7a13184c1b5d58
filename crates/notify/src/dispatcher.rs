//! Runs alerts: fetch postings, render the email, send, record delivery.
//!
//! Alerts in one run are processed concurrently. One alert failing never
//! blocks the others.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{info, warn};

use joby_core::config::NotifyConfig;
use joby_core::RawJobRecord;

use crate::alert::{Frequency, JobAlert};
use crate::jobs_client::JobFeed;
use crate::store::AlertStore;
use crate::templating::AlertRenderer;
use crate::traits::{Notifier, NotifyError};

/// Polling schedule for a resend that waits for postings to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.retry_interval_secs),
            max_wait: Duration::from_secs(config.max_wait_secs),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Tally of one scheduled run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub alerts: usize,
    pub sent: usize,
    pub empty: usize,
    pub failed: usize,
}

enum AlertOutcome {
    Sent,
    Empty,
    Failed,
}

pub struct AlertDispatcher {
    store: Arc<dyn AlertStore>,
    feed: Arc<dyn JobFeed>,
    notifier: Arc<dyn Notifier>,
    renderer: AlertRenderer,
    retry: RetryPolicy,
}

impl AlertDispatcher {
    pub fn new(
        store: Arc<dyn AlertStore>,
        feed: Arc<dyn JobFeed>,
        notifier: Arc<dyn Notifier>,
        retry: RetryPolicy,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            store,
            feed,
            notifier,
            renderer: AlertRenderer::new()?,
            retry,
        })
    }

    /// Run every enabled alert with this frequency once.
    pub async fn process_frequency(&self, frequency: Frequency) -> Result<RunSummary, NotifyError> {
        info!(%frequency, "processing alerts");
        let alerts = self.store.alerts_for(frequency).await?;

        let outcomes = join_all(alerts.iter().map(|alert| self.process_one(alert))).await;

        let mut summary = RunSummary {
            alerts: alerts.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                AlertOutcome::Sent => summary.sent += 1,
                AlertOutcome::Empty => summary.empty += 1,
                AlertOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            %frequency,
            alerts = summary.alerts,
            sent = summary.sent,
            empty = summary.empty,
            failed = summary.failed,
            "completed alert run"
        );
        Ok(summary)
    }

    async fn process_one(&self, alert: &JobAlert) -> AlertOutcome {
        let jobs = self.feed.jobs_for(alert).await;
        if jobs.is_empty() {
            return AlertOutcome::Empty;
        }
        match self.deliver(alert, &jobs).await {
            Ok(()) => AlertOutcome::Sent,
            Err(e) => {
                warn!(alert_id = %alert.id, error = %e, "alert delivery failed");
                AlertOutcome::Failed
            }
        }
    }

    /// Poll the feed until it returns postings or the retry window closes,
    /// then email them. Returns whether an email went out.
    pub async fn deliver_with_retry(&self, alert: &JobAlert) -> Result<bool, NotifyError> {
        let start = Instant::now();
        let mut attempts = 0u32;

        while start.elapsed() < self.retry.max_wait {
            attempts += 1;
            let jobs = self.feed.jobs_for(alert).await;
            if !jobs.is_empty() {
                info!(alert_id = %alert.id, attempts, count = jobs.len(), "jobs found for alert");
                self.deliver(alert, &jobs).await?;
                return Ok(true);
            }
            tokio::time::sleep(self.retry.interval).await;
        }

        warn!(
            alert_id = %alert.id,
            title = %alert.title,
            attempts,
            "no jobs found within retry window"
        );
        Ok(false)
    }

    /// Run `deliver_with_retry` in the background.
    pub fn spawn_resend(self: &Arc<Self>, alert: JobAlert) -> tokio::task::JoinHandle<bool> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            match dispatcher.deliver_with_retry(&alert).await {
                Ok(sent) => sent,
                Err(e) => {
                    warn!(alert_id = %alert.id, error = %e, "resend failed");
                    false
                }
            }
        })
    }

    /// Look up an enabled alert by id.
    pub async fn find_alert(&self, alert_id: &str) -> Result<Option<JobAlert>, NotifyError> {
        for frequency in Frequency::ALL {
            let alerts = self.store.alerts_for(frequency).await?;
            if let Some(alert) = alerts.into_iter().find(|a| a.id == alert_id) {
                return Ok(Some(alert));
            }
        }
        Ok(None)
    }

    async fn deliver(&self, alert: &JobAlert, jobs: &[RawJobRecord]) -> Result<(), NotifyError> {
        let notification = self.renderer.render(alert, jobs)?;
        self.notifier.send(&notification).await?;
        self.store.mark_sent(&alert.id, Utc::now()).await?;
        info!(
            alert_id = %alert.id,
            channel = self.notifier.channel_name(),
            jobs = jobs.len(),
            "alert sent"
        );
        Ok(())
    }
}
