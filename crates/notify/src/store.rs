//! Where alerts live between runs.
//!
//! The notifier never owns alert storage: it reads the enabled alerts for a
//! frequency and records when one was delivered.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::alert::{Frequency, JobAlert};
use crate::traits::NotifyError;

#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// Enabled alerts with the given frequency.
    async fn alerts_for(&self, frequency: Frequency) -> Result<Vec<JobAlert>, NotifyError>;

    /// Record a delivery. Unknown ids are ignored.
    async fn mark_sent(&self, alert_id: &str, at: DateTime<Utc>) -> Result<(), NotifyError>;
}

fn select(alerts: &[JobAlert], frequency: Frequency) -> Vec<JobAlert> {
    alerts
        .iter()
        .filter(|a| a.frequency == frequency && a.email_enabled)
        .cloned()
        .collect()
}

/// Alerts held in memory. Used by tests and one-off runs.
#[derive(Default)]
pub struct InMemoryAlertStore {
    alerts: RwLock<Vec<JobAlert>>,
}

impl InMemoryAlertStore {
    pub fn new(alerts: Vec<JobAlert>) -> Self {
        Self {
            alerts: RwLock::new(alerts),
        }
    }

    pub async fn snapshot(&self) -> Vec<JobAlert> {
        self.alerts.read().await.clone()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn alerts_for(&self, frequency: Frequency) -> Result<Vec<JobAlert>, NotifyError> {
        Ok(select(&self.alerts.read().await, frequency))
    }

    async fn mark_sent(&self, alert_id: &str, at: DateTime<Utc>) -> Result<(), NotifyError> {
        let mut alerts = self.alerts.write().await;
        if let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.last_sent_at = Some(at);
        }
        Ok(())
    }
}

/// Alerts kept in a JSON array on disk. A missing file reads as no alerts.
pub struct FileAlertStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileAlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<JobAlert>, NotifyError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "alerts file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(NotifyError::Store(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            NotifyError::Store(format!("invalid alerts file {}: {e}", self.path.display()))
        })
    }

    async fn save(&self, alerts: &[JobAlert]) -> Result<(), NotifyError> {
        let json = serde_json::to_string_pretty(alerts)
            .map_err(|e| NotifyError::Store(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| NotifyError::Store(e.to_string()))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| NotifyError::Store(format!("failed to write {}: {e}", self.path.display())))
    }
}

#[async_trait::async_trait]
impl AlertStore for FileAlertStore {
    async fn alerts_for(&self, frequency: Frequency) -> Result<Vec<JobAlert>, NotifyError> {
        let _guard = self.lock.lock().await;
        Ok(select(&self.load().await?, frequency))
    }

    async fn mark_sent(&self, alert_id: &str, at: DateTime<Utc>) -> Result<(), NotifyError> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.load().await?;
        let Some(alert) = alerts.iter_mut().find(|a| a.id == alert_id) else {
            return Ok(());
        };
        alert.last_sent_at = Some(at);
        self.save(&alerts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::tests::sample_alert;

    #[tokio::test]
    async fn in_memory_filters_frequency_and_disabled() {
        let mut off = sample_alert("off", Frequency::Daily);
        off.email_enabled = false;
        let store = InMemoryAlertStore::new(vec![
            sample_alert("d1", Frequency::Daily),
            sample_alert("w1", Frequency::Weekly),
            off,
        ]);

        let daily = store.alerts_for(Frequency::Daily).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].id, "d1");
    }

    #[tokio::test]
    async fn in_memory_mark_sent_updates_alert() {
        let store = InMemoryAlertStore::new(vec![sample_alert("d1", Frequency::Daily)]);
        let at = Utc::now();
        store.mark_sent("d1", at).await.unwrap();
        store.mark_sent("missing", at).await.unwrap();
        assert_eq!(store.snapshot().await[0].last_sent_at, Some(at));
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAlertStore::new(dir.path().join("alerts.json"));
        assert!(store.alerts_for(Frequency::Daily).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_round_trips_last_sent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("alerts.json");
        let store = FileAlertStore::new(&path);
        store
            .save(&[sample_alert("w1", Frequency::Weekly)])
            .await
            .unwrap();

        let at = Utc::now();
        store.mark_sent("w1", at).await.unwrap();

        let reopened = FileAlertStore::new(&path);
        let weekly = reopened.alerts_for(Frequency::Weekly).await.unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].last_sent_at, Some(at));
    }

    #[tokio::test]
    async fn file_store_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileAlertStore::new(&path);
        let err = store.alerts_for(Frequency::Daily).await.unwrap_err();
        assert!(matches!(err, NotifyError::Store(_)));
    }
}
