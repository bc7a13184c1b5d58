//! Notifier trait definition and shared error types.

/// Errors that can occur while processing or delivering an alert.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Alert store error: {0}")]
    Store(String),
}

/// A rendered alert email ready for delivery.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    /// Recipient address.
    pub recipient: String,
    /// The rendered subject line.
    pub subject: String,
    /// The rendered HTML body.
    pub body: String,
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "email").
    fn channel_name(&self) -> &str;
}
