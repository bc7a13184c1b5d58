//! Jobs search HTTP service.

pub mod api;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use state::AppState;
