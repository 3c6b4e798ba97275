use memchr::memmem::Finder;

use crate::pattern::Pattern;

/// Exact byte-subsequence search for one pattern.
///
/// Wraps a precompiled `memmem` finder (two-way search with a SIMD prefilter),
/// so lookups are linear in the haystack regardless of pattern length. The
/// finder owns its needle, which makes a `PatternMatcher` cheap to clone and
/// safe to share between worker threads.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    finder: Finder<'static>,
}

impl PatternMatcher {
    pub fn new(pattern: &Pattern) -> Self {
        Self {
            finder: Finder::new(pattern.as_bytes()).into_owned(),
        }
    }

    /// Length of the pattern in bytes
    pub fn pattern_len(&self) -> usize {
        self.finder.needle().len()
    }

    /// Returns true if the pattern occurs anywhere in `haystack`
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.finder.find(haystack).is_some()
    }

    /// Offset of the first occurrence of the pattern in `haystack`
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        self.finder.find(haystack)
    }
}
