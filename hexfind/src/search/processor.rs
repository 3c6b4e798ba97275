use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, trace};

use super::matcher::PatternMatcher;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;

/// Default number of bytes read from a file per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest chunk a processor will allocate, whatever the configuration asks for
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Scans file contents for a pattern in bounded chunks.
///
/// Memory use per file is `chunk_size + pattern_len - 1` bytes no matter how
/// large the file is. The last `pattern_len - 1` bytes of every window are
/// carried to the front of the next one, so an occurrence that straddles a
/// chunk boundary is still seen in a single contiguous slice.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    matcher: PatternMatcher,
    metrics: ScanMetrics,
    chunk_size: usize,
    max_file_size: Option<u64>,
}

impl FileProcessor {
    /// Creates a new FileProcessor with the given pattern matcher
    pub fn new(matcher: PatternMatcher) -> Self {
        Self {
            matcher,
            metrics: ScanMetrics::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_file_size: None,
        }
    }

    /// Sets the read chunk size, clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Files larger than `limit` bytes are reported instead of read
    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Returns whether the file at `path` contains the pattern.
    ///
    /// Open and read failures come back as per-file errors
    /// (`FileNotFound`, `PermissionDenied`, `ReadFile`, `FileTooLarge`).
    pub fn process_file(&self, path: &Path) -> SearchResult<bool> {
        debug!("Searching {}", path.display());

        let file = File::open(path).map_err(|e| {
            self.metrics.record_read_error();
            SearchError::from_io(path, e)
        })?;

        if let Some(limit) = self.max_file_size {
            let size = file
                .metadata()
                .map_err(|e| {
                    self.metrics.record_read_error();
                    SearchError::from_io(path, e)
                })?
                .len();
            if size > limit {
                self.metrics.record_oversized();
                return Err(SearchError::file_too_large(path, size, limit));
            }
        }

        let matched = self.contains_pattern(file).map_err(|e| {
            self.metrics.record_read_error();
            SearchError::from_io(path, e)
        })?;

        self.metrics.record_file(matched);
        trace!("{} -> {}", path.display(), if matched { "match" } else { "no match" });
        Ok(matched)
    }

    /// Streams `reader` chunk by chunk and stops at the first occurrence.
    pub fn contains_pattern<R: Read>(&self, mut reader: R) -> io::Result<bool> {
        let overlap = self.matcher.pattern_len().saturating_sub(1);
        let mut buffer = vec![0u8; overlap + self.chunk_size];
        let mut carried = 0;

        loop {
            let read = match reader.read(&mut buffer[carried..carried + self.chunk_size]) {
                Ok(0) => return Ok(false),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.metrics.record_chunk(read as u64);
            trace!("Read chunk of {} bytes ({} carried)", read, carried);

            let filled = carried + read;
            if self.matcher.is_match(&buffer[..filled]) {
                return Ok(true);
            }

            let keep = overlap.min(filled);
            buffer.copy_within(filled - keep..filled, 0);
            carried = keep;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use std::fs;
    use tempfile::tempdir;

    fn processor(hex: &str) -> FileProcessor {
        FileProcessor::new(PatternMatcher::new(&Pattern::from_hex(hex).unwrap()))
    }

    /// Hands out at most `step` bytes per read call
    struct TrickleReader<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for TrickleReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_pattern_at_start_middle_and_end() {
        let dir = tempdir().unwrap();
        let p = processor("48656C6C6F");

        let cases: [(&str, &[u8], bool); 5] = [
            ("start.bin", b"Hello, then more bytes", true),
            ("middle.bin", b"\x00\xFF\x00Hello\x00", true),
            ("end.bin", b"ends with Hello", true),
            ("exact.bin", b"Hello", true),
            ("absent.bin", b"Help! Hell, lo", false),
        ];

        for (name, content, expected) in cases {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            assert_eq!(p.process_file(&path).unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn test_empty_file_never_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        assert!(!processor("00").process_file(&path).unwrap());
    }

    #[test]
    fn test_chunk_boundary_handling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boundary.bin");

        // Pattern straddles every possible split point of a 16-byte chunk.
        let pattern = b"Hello";
        for split in 1..pattern.len() {
            let mut content = vec![b'.'; 16 - split];
            content.extend_from_slice(pattern);
            content.extend(vec![b'.'; 40]);
            fs::write(&path, &content).unwrap();

            let p = processor("48656C6C6F").with_chunk_size(16);
            assert!(p.process_file(&path).unwrap(), "split at {}", split);
            assert!(p.metrics().get_stats().chunks_read >= 2);
        }
    }

    #[test]
    fn test_chunk_size_is_clamped() {
        assert_eq!(processor("00").with_chunk_size(0).chunk_size, 1);
        assert_eq!(
            processor("00").with_chunk_size(usize::MAX).chunk_size,
            MAX_CHUNK_SIZE
        );

        let p = processor("48656C6C6F").with_chunk_size(usize::MAX);
        assert!(p.contains_pattern(&b"..Hello.."[..]).unwrap());
    }

    #[test]
    fn test_pattern_larger_than_chunk() {
        let p = processor("0102030405060708").with_chunk_size(3);
        let mut data = vec![0xEE; 50];
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data.extend(vec![0xEE; 50]);
        assert!(p.contains_pattern(data.as_slice()).unwrap());
    }

    #[test]
    fn test_short_reads() {
        let p = processor("DEADBEEF").with_chunk_size(4);
        let mut data = vec![0u8; 997];
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let reader = TrickleReader {
            data: &data,
            step: 1,
        };
        assert!(p.contains_pattern(reader).unwrap());

        let reader = TrickleReader {
            data: &data[..999],
            step: 3,
        };
        assert!(!p.contains_pattern(reader).unwrap());
    }

    #[test]
    fn test_large_file_no_false_positive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let content: Vec<u8> = (0..(DEFAULT_CHUNK_SIZE * 3)).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        // 0xFB never occurs since values wrap at 251.
        let p = processor("FBFB");
        assert!(!p.process_file(&path).unwrap());
        assert_eq!(p.metrics().get_stats().bytes_read, content.len() as u64);

        let p = processor("FAFA");
        assert!(!p.process_file(&path).unwrap());

        let p = processor("F9FA00");
        assert!(p.process_file(&path).unwrap());
    }

    #[test]
    fn test_missing_file_is_per_file_error() {
        let dir = tempdir().unwrap();
        let p = processor("00");
        let err = p.process_file(&dir.path().join("vanished.bin")).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(_)));
        assert!(!err.is_fatal());
        assert_eq!(p.metrics().get_stats().read_errors, 1);
    }

    #[test]
    fn test_max_file_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![0x41; 128]).unwrap();

        let p = processor("41").with_max_file_size(Some(64));
        let err = p.process_file(&path).unwrap_err();
        assert!(matches!(
            err,
            SearchError::FileTooLarge {
                size: 128,
                limit: 64,
                ..
            }
        ));
        assert_eq!(p.metrics().get_stats().oversized_skipped, 1);

        let p = processor("41").with_max_file_size(Some(128));
        assert!(p.process_file(&path).unwrap());
    }
}
