use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Tracks scan throughput across worker threads
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    files_scanned: Arc<AtomicU64>,
    files_matched: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    chunks_read: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    oversized_skipped: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            files_scanned: Arc::new(AtomicU64::new(0)),
            files_matched: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            chunks_read: Arc::new(AtomicU64::new(0)),
            read_errors: Arc::new(AtomicU64::new(0)),
            oversized_skipped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records one chunk of `bytes` read from a file
    pub fn record_chunk(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        self.chunks_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file that was scanned to completion or to its first match
    pub fn record_file(&self, matched: bool) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        if matched {
            self.files_matched.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_oversized(&self) {
        self.oversized_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_matched: self.files_matched.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            chunks_read: self.chunks_read.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            oversized_skipped: self.oversized_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        debug!(
            "Scan stats:\n\
             Files scanned/matched: {}/{}\n\
             Bytes read: {} in {} chunks\n\
             Read errors: {}\n\
             Skipped as too large: {}",
            stats.files_scanned,
            stats.files_matched,
            stats.bytes_read,
            stats.chunks_read,
            stats.read_errors,
            stats.oversized_skipped
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub files_matched: u64,
    pub bytes_read: u64,
    pub chunks_read: u64,
    pub read_errors: u64,
    pub oversized_skipped: u64,
}
