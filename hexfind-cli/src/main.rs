use clap::{CommandFactory, Parser};
use colored::Colorize;
use hexfind::{search, Pattern, SearchConfig, SearchError, SearchOutput};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode, time::Duration};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, SearchError>;

/// Search a directory tree for files containing the given bytes
#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    override_usage = "hexfind-cli [OPTIONS] <DIRECTORY> <HEXBYTES>"
)]
struct Cli {
    /// Follow hidden dot directories and files
    #[arg(short = 'd')]
    dotted: bool,

    /// No output apart from errors
    #[arg(short = 'q')]
    quiet: bool,

    /// Print detailed operations
    #[arg(short = 'v')]
    verbose: bool,

    /// Number of threads used to scan files
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Report files larger than this many bytes instead of reading them
    #[arg(long = "max-filesize", value_name = "BYTES")]
    max_filesize: Option<u64>,

    /// Path to a YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to search, then the hex bytes to find (e.g. 1A34F8)
    #[arg(value_name = "DIRECTORY HEXBYTES", num_args = 0..)]
    operands: Vec<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let [directory, hexbytes] = cli.operands.as_slice() else {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    };

    // Reject bad patterns before touching the filesystem.
    let pattern = Pattern::from_hex(hexbytes)?;

    let cli_config = SearchConfig::new(directory)
        .with_follow_hidden(cli.dotted)
        .with_quiet(cli.quiet)
        .with_verbose(cli.verbose)
        .with_max_file_size(cli.max_filesize);

    let mut config = SearchConfig::load_from(cli.config.as_deref())
        .map_err(|e| SearchError::config_error(e.to_string()))?
        .merge_with_cli(cli_config);
    if let Some(threads) = cli.threads {
        config.thread_count = threads;
    }

    init_logging(&config);
    debug!("Effective configuration: {:?}", config);

    let output = search(&config, &pattern)?;
    print_search_results(&output, config.quiet);
    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    let mut cmd = Cli::command();
    // Printing help only fails when stdout is closed.
    let _ = cmd.print_help();
}

fn init_logging(config: &SearchConfig) {
    let level = config.effective_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hexfind={level},hexfind_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_search_results(output: &SearchOutput, quiet: bool) {
    // Per-file errors go to stderr even in quiet mode.
    for error in &output.errors {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }

    if quiet {
        return;
    }

    for path in &output.matched_files {
        println!("{}", path.display().to_string().blue());
    }

    println!(
        "Processed {} total items in {}",
        output.processed_count,
        format_elapsed(output.elapsed)
    );
}

/// Formats `elapsed` rounded down to whole microseconds
fn format_elapsed(elapsed: Duration) -> String {
    let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    humantime::format_duration(Duration::from_micros(micros)).to_string()
}

/// Usage-level problems exit with 2, failed walks with 1
fn exit_status(error: &SearchError) -> u8 {
    match error {
        SearchError::InvalidPattern(_) | SearchError::ConfigError(_) => 2,
        _ => 1,
    }
}
