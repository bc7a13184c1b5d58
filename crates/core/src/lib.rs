pub mod config;
pub mod error;
pub mod record;
pub mod search;
pub mod source;

pub use config::Config;
pub use error::*;
pub use record::*;
pub use search::*;
pub use source::*;
