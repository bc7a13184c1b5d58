//! notify-worker: runs saved-search alerts on their cron schedules.
//!
//! Alerts are read from a JSON file and replayed against the jobs search
//! API; matching postings are emailed to the alert's owner.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use joby_notify::{
    AlertDispatcher, AlertScheduler, EmailNotifier, FileAlertStore, Frequency, JobsClient,
    RetryPolicy,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Job alert worker. Emails new postings for saved searches.
#[derive(Parser, Debug)]
#[command(name = "notify-worker", version, about)]
struct Cli {
    /// Path to the alerts JSON file.
    #[arg(long, env = "ALERTS_FILE")]
    alerts_file: Option<PathBuf>,

    /// Base URL of the jobs search API.
    #[arg(long, env = "JOBS_SERVER_URL")]
    jobs_server_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cron scheduler until interrupted (default).
    Run,
    /// Process every alert of one frequency now.
    Once {
        /// daily, twice_week or weekly
        frequency: String,
    },
    /// Poll for postings for one alert and email them once found.
    Resend {
        /// Alert id.
        id: String,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    joby_core::config::load_dotenv();
    let cli = Cli::parse();
    let mut config = joby_core::Config::from_env();
    if let Some(path) = cli.alerts_file {
        config.notify.alerts_file = path;
    }
    if let Some(url) = cli.jobs_server_url {
        config.notify.jobs_server_url = url;
    }
    config.log_summary();

    let store = Arc::new(FileAlertStore::new(&config.notify.alerts_file));
    let feed = Arc::new(JobsClient::from_config(&config.notify)?);
    let notifier = Arc::new(EmailNotifier::from_config(&config.smtp)?);
    let dispatcher = Arc::new(AlertDispatcher::new(
        store,
        feed,
        notifier,
        RetryPolicy::from_config(&config.notify),
    )?);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let scheduler = AlertScheduler::new()?;
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(true);
                }
            });

            info!(
                alerts = %config.notify.alerts_file.display(),
                tick_secs = config.notify.tick_secs,
                "notify-worker starting"
            );
            scheduler
                .run(
                    dispatcher,
                    Duration::from_secs(config.notify.tick_secs),
                    shutdown_rx,
                )
                .await;
            info!("notify-worker exited cleanly");
        }
        Command::Once { frequency } => {
            let frequency: Frequency = frequency.parse()?;
            let summary = dispatcher.process_frequency(frequency).await?;
            info!(?summary, "run finished");
        }
        Command::Resend { id } => match dispatcher.find_alert(&id).await? {
            Some(alert) => {
                let sent = dispatcher.spawn_resend(alert).await?;
                info!(alert_id = %id, sent, "resend finished");
            }
            None => warn!(alert_id = %id, "no enabled alert with that id"),
        },
    }

    Ok(())
}
