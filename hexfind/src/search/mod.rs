//! Directory traversal and file content matching.
//!
//! The walk is split in two phases. [`engine`] lists the tree depth-first in
//! file-name order, applying the hidden-entry filter and counting every entry
//! it keeps. The regular files it finds are then handed to a
//! [`FileProcessor`], which streams each one through a [`PatternMatcher`] on a
//! bounded rayon pool. Listing failures abort the run; read failures only skip
//! the file concerned.
pub mod engine;
pub mod matcher;
pub mod processor;

use std::path::Path;

pub use engine::{search, walk};
pub use matcher::PatternMatcher;
pub use processor::FileProcessor;

use crate::errors::SearchResult;
use crate::pattern::Pattern;

/// Returns whether the file at `path` contains `pattern`.
///
/// One-off form of [`FileProcessor::process_file`] with default settings.
pub fn matches(path: &Path, pattern: &Pattern) -> SearchResult<bool> {
    FileProcessor::new(PatternMatcher::new(pattern)).process_file(path)
}
