use joby_compute::SearchEngine;
use joby_core::Config;

/// Shared, read-only state for request handlers.
pub struct AppState {
    pub config: Config,
    pub engine: SearchEngine,
}
