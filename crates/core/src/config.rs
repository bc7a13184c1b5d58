use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::SourceId;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Process-wide configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub scraper: ScraperConfig,
    pub notify: NotifyConfig,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `JOBY_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("JOBY_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            search: SearchConfig::from_env_profiled(p),
            scraper: ScraperConfig::from_env_profiled(p),
            notify: NotifyConfig::from_env_profiled(p),
            smtp: SmtpConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        let sources: Vec<&str> = self.search.sources.iter().map(|s| s.as_str()).collect();
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  search:   sources={}, per_source={}, total={}, results_wanted={}, timeout={}s",
            sources.join(","),
            self.search.target_per_source,
            self.search.total_target,
            self.search.results_wanted,
            self.search.source_timeout_secs
        );
        tracing::info!("  scraper:  url={}", self.scraper.url);
        tracing::info!("  notify:   jobs_server={}, alerts={}", self.notify.jobs_server_url, self.notify.alerts_file.display());
        tracing::info!(
            "  smtp:     server={}:{}, configured={}",
            self.smtp.server,
            self.smtp.port,
            self.smtp.is_configured()
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8002),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Search ────────────────────────────────────────────────────

/// Fan-out and quota settings for the job search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub sources: Vec<SourceId>,
    pub target_per_source: usize,
    pub total_target: usize,
    /// Candidates requested from each source before filtering.
    pub results_wanted: u32,
    pub source_timeout_secs: u64,
    /// Upper bound on concurrently running source fetches.
    pub max_concurrency: usize,
}

impl SearchConfig {
    fn from_env_profiled(p: &str) -> Self {
        let sources = parse_sources(&profiled_env_or(p, "SEARCH_SOURCES", "indeed,linkedin"));
        Self {
            sources: if sources.is_empty() { SourceId::defaults() } else { sources },
            target_per_source: profiled_env_usize(p, "SEARCH_TARGET_PER_SOURCE", 5),
            total_target: profiled_env_usize(p, "SEARCH_TOTAL_TARGET", 10),
            results_wanted: profiled_env_u32(p, "SEARCH_RESULTS_WANTED", 50),
            source_timeout_secs: profiled_env_u64(p, "SEARCH_SOURCE_TIMEOUT_SECS", 90),
            max_concurrency: profiled_env_usize(p, "SEARCH_MAX_CONCURRENCY", 4).max(1),
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            sources: SourceId::defaults(),
            target_per_source: 5,
            total_target: 10,
            results_wanted: 50,
            source_timeout_secs: 90,
            max_concurrency: 4,
        }
    }
}

/// Parse a comma-separated source list, skipping unknown names.
fn parse_sources(raw: &str) -> Vec<SourceId> {
    let mut out = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<SourceId>() {
            Ok(id) if !out.contains(&id) => out.push(id),
            Ok(_) => {}
            Err(e) => tracing::warn!(source = name, error = %e, "ignoring unknown search source"),
        }
    }
    out
}

// ── Scraper service ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl ScraperConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "SCRAPER_URL", "http://localhost:8003"),
            timeout_secs: profiled_env_u64(p, "SCRAPER_TIMEOUT_SECS", 120),
        }
    }
}

// ── Alert notifications ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub jobs_server_url: String,
    pub request_timeout_secs: u64,
    pub retry_interval_secs: u64,
    pub max_wait_secs: u64,
    pub alerts_file: PathBuf,
    pub tick_secs: u64,
}

impl NotifyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            jobs_server_url: profiled_env_or(p, "JOBS_SERVER_URL", "http://localhost:8002"),
            request_timeout_secs: profiled_env_u64(p, "JOBS_REQUEST_TIMEOUT_SECS", 120),
            retry_interval_secs: profiled_env_u64(p, "RESEND_RETRY_SECS", 30),
            max_wait_secs: profiled_env_u64(p, "RESEND_MAX_WAIT_SECS", 600),
            alerts_file: PathBuf::from(profiled_env_or(p, "ALERTS_FILE", "data/alerts.json")),
            tick_secs: profiled_env_u64(p, "NOTIFY_TICK_SECS", 60).max(1),
        }
    }
}

// ── SMTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

impl SmtpConfig {
    fn from_env_profiled(p: &str) -> Self {
        let username = profiled_env_opt(p, "EMAIL_USER");
        Self {
            server: profiled_env_or(p, "SMTP_SERVER", "smtp.gmail.com"),
            port: profiled_env_u16(p, "SMTP_PORT", 587),
            from: profiled_env_opt(p, "EMAIL_FROM").or_else(|| username.clone()),
            username,
            password: profiled_env_opt(p, "EMAIL_PASSWORD"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}
