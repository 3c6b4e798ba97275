use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::search::processor::DEFAULT_CHUNK_SIZE;

/// Configuration for one walk of a directory tree.
///
/// # Configuration Locations
///
/// Values are layered from these files, later ones overriding earlier ones:
/// 1. Global `$HOME/.config/hexfind/config.yaml`
/// 2. Local `.hexfind.yaml` in the current directory
/// 3. Custom config file specified via `--config` (must exist)
///
/// # Configuration Format
///
/// ```yaml
/// # Descend into and search dot entries
/// follow_hidden: false
///
/// # Worker threads used to scan file contents (default: CPU cores)
/// thread_count: 4
///
/// # Files larger than this many bytes are reported instead of read
/// max_file_size: 1073741824
///
/// # Bytes read per chunk while scanning a file
/// chunk_size: 65536
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// Command-line flags take precedence, see [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory to start the walk from
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Visit entries whose name starts with `.`
    #[serde(default)]
    pub follow_hidden: bool,

    /// Raise the log level to `debug` so every entry visited and every skip
    /// decision is logged. Only read through [`SearchConfig::effective_log_level`];
    /// the walk itself behaves the same either way.
    #[serde(default)]
    pub verbose: bool,

    /// Lower the log level to `error` and suppress the summary. Like
    /// `verbose`, it never changes what the walk finds.
    #[serde(default)]
    pub quiet: bool,

    /// Number of threads used to scan file contents
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Upper bound on the size of a file that will be read
    #[serde(default)]
    pub max_file_size: Option<u64>,

    /// Bytes read per chunk while scanning a file, capped at 64 MiB
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            follow_hidden: false,
            verbose: false,
            quiet: false,
            thread_count: default_thread_count(),
            max_file_size: None,
            chunk_size: default_chunk_size(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for walking `root_path` with default settings
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    pub fn with_follow_hidden(mut self, follow_hidden: bool) -> Self {
        self.follow_hidden = follow_hidden;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_thread_count(mut self, count: NonZeroUsize) -> Self {
        self.thread_count = count;
        self
    }

    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Log filter implied by the quiet and verbose switches.
    ///
    /// Quiet wins over verbose; with neither set the configured level is used.
    /// Library callers install their own `tracing` subscriber and can feed it
    /// this level to get the same behavior as the command line.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let default_files = [
            dirs::config_dir().map(|p| p.join("hexfind/config.yaml")),
            Some(PathBuf::from(".hexfind.yaml")),
        ];

        for path in default_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly named file is required to exist.
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli_config: SearchConfig) -> Self {
        // The root always comes from the command line.
        self.root_path = cli_config.root_path;
        self.follow_hidden |= cli_config.follow_hidden;
        self.verbose |= cli_config.verbose;
        self.quiet |= cli_config.quiet;
        if cli_config.thread_count != default_thread_count() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.max_file_size.is_some() {
            self.max_file_size = cli_config.max_file_size;
        }
        if cli_config.chunk_size != default_chunk_size() {
            self.chunk_size = cli_config.chunk_size;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            root_path: "data"
            follow_hidden: true
            thread_count: 2
            max_file_size: 1048576
            chunk_size: 4096
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("data"));
        assert!(config.follow_hidden);
        assert_eq!(config.thread_count, NonZeroUsize::new(2).unwrap());
        assert_eq!(config.max_file_size, Some(1_048_576));
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"follow_hidden: false\n").unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("."));
        assert!(!config.follow_hidden);
        assert!(!config.verbose);
        assert!(!config.quiet);
        assert_eq!(config.max_file_size, None);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.thread_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"thread_count: \"many\"\nfollow_hidden: []\n")
            .unwrap();

        assert!(SearchConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SearchConfig::load_from(Some(Path::new("nonexistent-hexfind.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = SearchConfig::new("from-file")
            .with_thread_count(NonZeroUsize::new(3).unwrap())
            .with_max_file_size(Some(100))
            .with_chunk_size(1024);

        let cli_config = SearchConfig::new("/tmp/tree").with_follow_hidden(true);

        let merged = config_file.merge_with_cli(cli_config);
        assert_eq!(merged.root_path, PathBuf::from("/tmp/tree")); // CLI value
        assert!(merged.follow_hidden); // CLI value
        assert_eq!(merged.thread_count, NonZeroUsize::new(3).unwrap()); // File value
        assert_eq!(merged.max_file_size, Some(100)); // File value
        assert_eq!(merged.chunk_size, 1024); // File value
    }

    #[test]
    fn test_merge_cli_overrides() {
        let config_file = SearchConfig::new(".").with_max_file_size(Some(100));
        let mut cli_config = SearchConfig::new("root")
            .with_max_file_size(Some(5))
            .with_quiet(true);
        cli_config.log_level = "trace".to_string();

        let merged = config_file.merge_with_cli(cli_config);
        assert_eq!(merged.max_file_size, Some(5));
        assert!(merged.quiet);
        assert_eq!(merged.log_level, "trace");
    }

    #[test]
    fn test_effective_log_level() {
        let config = SearchConfig::new(".");
        assert_eq!(config.effective_log_level(), "warn");

        let config = SearchConfig::new(".").with_verbose(true);
        assert_eq!(config.effective_log_level(), "debug");

        let config = SearchConfig::new(".").with_verbose(true).with_quiet(true);
        assert_eq!(config.effective_log_level(), "error");
    }
}
