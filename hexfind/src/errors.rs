/// Error types for hexfind.
///
/// Errors fall into two groups. Fatal errors (a missing or non-directory root,
/// a directory that cannot be listed) abort the whole walk and are returned as
/// `Err` from [`crate::search::search`]. Per-item errors (a file that cannot be
/// read, a file over the size limit, a reported link loop) are collected into
/// [`crate::results::SearchOutput::errors`] and the walk carries on.
///
/// ```rust,ignore
/// match hexfind::search(&config, &pattern) {
///     Ok(output) => {
///         for err in &output.errors {
///             eprintln!("skipped: {}", err);
///         }
///     }
///     Err(SearchError::NotADirectory(path)) => // Bad root,
///     Err(e) => // Other fatal errors
/// }
/// ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while decoding a pattern or walking a tree
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("File too large: {path} ({size} bytes, limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("Symlink loop: {0}")]
    SymlinkLoop(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn file_too_large(path: impl Into<PathBuf>, size: u64, limit: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            size,
            limit,
        }
    }

    pub fn symlink_loop(path: impl Into<PathBuf>) -> Self {
        Self::SymlinkLoop(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an I/O error raised while opening or reading `path`
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::ReadFile {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path this error occurred at, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::RootNotFound(p)
            | Self::NotADirectory(p)
            | Self::FileNotFound(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::ReadDir { path: p, .. }
            | Self::ReadFile { path: p, .. }
            | Self::FileTooLarge { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Per-item errors (unreadable or oversized files, link loops) only skip
    /// the item they were raised for.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::FileNotFound(_)
                | Self::PermissionDenied(_)
                | Self::ReadFile { .. }
                | Self::FileTooLarge { .. }
                | Self::SymlinkLoop(_)
        )
    }
}
