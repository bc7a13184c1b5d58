//! Source adapters for external job boards.
//!
//! Each adapter turns a validated search into a board-specific query and
//! fetches raw rows through the scrape service. Adapters are independent:
//! one failing says nothing about the others.

pub mod mapping;
pub mod scrape;
pub mod source;

pub use scrape::{build_sources, HttpSource, ScrapeClient};
pub use source::{JobSource, SourceError, SourceQuery};
