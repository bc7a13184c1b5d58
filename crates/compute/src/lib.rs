pub mod engine;
pub mod level;
pub mod ordering;
pub mod quota;
pub mod seniority;
pub mod types;

pub use engine::SearchEngine;
pub use quota::QuotaMerger;
pub use types::{ClassifiedJob, MergedResultSet, SearchOutcome, SourceResultSet};
