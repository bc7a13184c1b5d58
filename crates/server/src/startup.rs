//! Server startup: build shared state from config.

use std::sync::Arc;

use tracing::info;

use joby_compute::SearchEngine;
use joby_connector::build_sources;
use joby_core::Config;

use crate::state::AppState;

/// Wire the configured sources into a search engine and wrap it in `AppState`.
pub fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let sources = build_sources(&config.search.sources, &config.scraper)?;
    info!(
        sources = sources.len(),
        scraper = %config.scraper.url,
        "source adapters ready"
    );

    let engine = SearchEngine::new(sources, config.search.clone());

    Ok(Arc::new(AppState {
        config: config.clone(),
        engine,
    }))
}
