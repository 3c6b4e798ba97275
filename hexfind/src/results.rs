use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::SearchError;
use crate::metrics::ScanStats;

/// Aggregate outcome of one walk.
///
/// Only produced when the walk completes. A fatal error is returned as `Err`
/// by [`crate::search::search`] instead, so a `SearchOutput` never holds a
/// partial count.
#[derive(Debug, Default)]
pub struct SearchOutput {
    /// Entries processed below the root (files, directories, links), the root
    /// itself excluded. Hidden entries only count when they are followed.
    pub processed_count: usize,
    /// Files containing the pattern, in walk order
    pub matched_files: Vec<PathBuf>,
    /// Per-item errors; each one skipped a single file or directory
    pub errors: Vec<SearchError>,
    /// Hidden entries left out of the walk
    pub hidden_skipped: usize,
    /// Symbolic links counted but not followed
    pub symlinks_skipped: usize,
    /// Content scan statistics
    pub stats: ScanStats,
    /// Wall-clock time of the walk
    pub elapsed: Duration,
}

impl SearchOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_with_matches(&self) -> usize {
        self.matched_files.len()
    }

    /// True when every file reachable by the walk was actually scanned
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if `path` was reported as a match
    pub fn contains_match(&self, path: &Path) -> bool {
        self.matched_files.iter().any(|p| p == path)
    }

    pub(crate) fn add_match(&mut self, path: PathBuf) {
        self.matched_files.push(path);
    }

    pub(crate) fn add_error(&mut self, error: SearchError) {
        self.errors.push(error);
    }
}
