//! Saved-search alerts for the jobs search service.
//!
//! This crate provides:
//! - `JobAlert` and `Frequency`, the stored saved searches
//! - `AlertStore` for loading alerts and recording deliveries
//! - `JobsClient` that replays an alert against `/jobs_search`
//! - Minijinja rendering of the alert email and an SMTP `Notifier`
//! - `AlertDispatcher` for scheduled runs and delayed resends
//! - Cron schedules that decide which frequencies are due

pub mod alert;
pub mod dispatcher;
pub mod email;
pub mod jobs_client;
pub mod scheduler;
pub mod store;
pub mod templating;
pub mod traits;

pub use alert::{Frequency, JobAlert, Subscriber};
pub use dispatcher::{AlertDispatcher, RetryPolicy, RunSummary};
pub use email::EmailNotifier;
pub use jobs_client::{JobFeed, JobsClient};
pub use scheduler::AlertScheduler;
pub use store::{AlertStore, FileAlertStore, InMemoryAlertStore};
pub use templating::AlertRenderer;
pub use traits::{Notification, Notifier, NotifyError};
