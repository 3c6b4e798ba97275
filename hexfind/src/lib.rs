pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod pattern;
pub mod results;
pub mod search;

pub use config::SearchConfig;
pub use errors::{SearchError, SearchResult};
pub use pattern::Pattern;
pub use results::SearchOutput;
pub use search::{search, walk};
