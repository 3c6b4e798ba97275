use ignore::{DirEntry, WalkBuilder};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::matcher::PatternMatcher;
use super::processor::FileProcessor;
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::filters::should_visit;
use crate::pattern::Pattern;
use crate::results::SearchOutput;

/// What the directory walk found before any file content is read
#[derive(Debug, Default)]
struct Listing {
    processed_count: usize,
    files: Vec<PathBuf>,
    symlinks_skipped: usize,
    errors: Vec<SearchError>,
}

/// Searches the tree rooted at `config.root_path`
pub fn search(config: &SearchConfig, pattern: &Pattern) -> SearchResult<SearchOutput> {
    walk(&config.root_path, pattern, config)
}

/// Walks the tree under `root` and reports every regular file containing
/// `pattern`.
///
/// Fatal errors (root missing or not a directory, a directory that cannot be
/// listed) are returned as `Err`. Files that cannot be read are recorded in
/// [`SearchOutput::errors`] and the walk goes on.
pub fn walk(root: &Path, pattern: &Pattern, config: &SearchConfig) -> SearchResult<SearchOutput> {
    let start = Instant::now();
    let root = resolve_root(root)?;
    info!(
        "Starting search for {} ({} bytes) under {}",
        pattern,
        pattern.len(),
        root.display()
    );

    let hidden_skipped = Arc::new(AtomicUsize::new(0));
    let listing = list_tree(&root, config.follow_hidden, Arc::clone(&hidden_skipped))?;
    debug!(
        "Found {} files to scan among {} entries",
        listing.files.len(),
        listing.processed_count
    );

    let processor = FileProcessor::new(PatternMatcher::new(pattern))
        .with_chunk_size(config.chunk_size)
        .with_max_file_size(config.max_file_size);

    let mut output = scan_listing(listing, &processor, config.thread_count.get())?;
    output.hidden_skipped = hidden_skipped.load(Ordering::Relaxed);
    output.elapsed = start.elapsed();

    info!(
        "Search complete. {} of {} entries matched, {} errors",
        output.files_with_matches(),
        output.processed_count,
        output.errors.len()
    );

    Ok(output)
}

/// Makes `path` absolute and checks it names a directory
fn resolve_root(path: &Path) -> SearchResult<PathBuf> {
    let root = path.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SearchError::root_not_found(path),
        _ => SearchError::read_dir(path, e),
    })?;

    let metadata = root.metadata().map_err(|e| SearchError::read_dir(&root, e))?;
    if !metadata.is_dir() {
        return Err(SearchError::not_a_directory(path));
    }

    Ok(root)
}

/// Lists every entry below `root` depth-first in file-name order.
///
/// The root itself is not counted. Symbolic links are counted but never
/// followed, which also keeps the walk free of link cycles.
fn list_tree(
    root: &Path,
    follow_hidden: bool,
    hidden_skipped: Arc<AtomicUsize>,
) -> SearchResult<Listing> {
    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if should_visit(entry.file_name(), follow_hidden) {
                return true;
            }
            debug!("Skipping hidden {}", entry.path().display());
            hidden_skipped.fetch_add(1, Ordering::Relaxed);
            false
        });

    let mut listing = Listing::default();

    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                let err = map_walk_error(err, root);
                if err.is_fatal() {
                    return Err(err);
                }
                warn!("Skipping {}", err);
                listing.errors.push(err);
                continue;
            }
        };

        if entry.depth() == 0 {
            debug!("Processing {}", entry.path().display());
            continue;
        }

        listing.processed_count += 1;
        visit(entry, &mut listing);
    }

    Ok(listing)
}

fn visit(entry: DirEntry, listing: &mut Listing) {
    match entry.file_type() {
        Some(ft) if ft.is_dir() => debug!("Processing {}", entry.path().display()),
        Some(ft) if ft.is_file() => listing.files.push(entry.into_path()),
        Some(ft) if ft.is_symlink() => {
            debug!("Not following symlink {}", entry.path().display());
            listing.symlinks_skipped += 1;
        }
        _ => debug!("Skipping special file {}", entry.path().display()),
    }
}

/// Scans the files of `listing` and folds the outcomes into a result.
///
/// A file that disappeared or became unreadable since it was listed is still
/// counted; its error is recorded and the other files are scanned as usual.
fn scan_listing(
    listing: Listing,
    processor: &FileProcessor,
    threads: usize,
) -> SearchResult<SearchOutput> {
    let outcomes = scan_files(processor, &listing.files, threads)?;

    let mut output = SearchOutput::new();
    output.processed_count = listing.processed_count;
    output.symlinks_skipped = listing.symlinks_skipped;
    for error in listing.errors {
        output.add_error(error);
    }

    for (path, outcome) in listing.files.into_iter().zip(outcomes) {
        match outcome {
            Ok(true) => output.add_match(path),
            Ok(false) => {}
            Err(e) => {
                debug!("Could not scan {}: {}", path.display(), e);
                output.add_error(e);
            }
        }
    }

    processor.metrics().log_stats();
    output.stats = processor.metrics().get_stats();
    Ok(output)
}

/// Scans `files` on a pool of `threads` workers, preserving input order
fn scan_files(
    processor: &FileProcessor,
    files: &[PathBuf],
    threads: usize,
) -> SearchResult<Vec<SearchResult<bool>>> {
    if threads <= 1 || files.len() <= 1 {
        return Ok(files.iter().map(|path| processor.process_file(path)).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            SearchError::config_error(format!("failed to start {} worker threads: {}", threads, e))
        })?;

    Ok(pool.install(|| {
        files
            .par_iter()
            .map(|path| processor.process_file(path))
            .collect()
    }))
}

fn map_walk_error(err: ignore::Error, dir: &Path) -> SearchError {
    match err {
        ignore::Error::WithDepth { err, .. } => map_walk_error(*err, dir),
        ignore::Error::WithPath { path, err } => map_walk_error(*err, &path),
        ignore::Error::Loop { child, .. } => SearchError::symlink_loop(child),
        ignore::Error::Io(e) => SearchError::read_dir(dir, e),
        other => SearchError::read_dir(dir, io::Error::new(io::ErrorKind::Other, other.to_string())),
    }
}
