use std::fmt;
use std::str::FromStr;

use crate::errors::{SearchError, SearchResult};

/// The byte sequence being searched for, decoded from hex text.
///
/// A `Pattern` is never empty: decoding rejects empty input, odd-length input
/// and anything that is not a hex digit, so callers can hand a `Pattern` to the
/// matcher without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    bytes: Vec<u8>,
}

impl Pattern {
    /// Decodes a hex string such as `"48656C6C6F"` (either case).
    ///
    /// Surrounding whitespace is not stripped; it is rejected like any other
    /// non-hex character.
    pub fn from_hex(text: &str) -> SearchResult<Self> {
        if text.is_empty() {
            return Err(SearchError::invalid_pattern("hex string is empty"));
        }

        let bytes = hex::decode(text).map_err(|e| match e {
            hex::FromHexError::OddLength => SearchError::invalid_pattern(format!(
                "'{}' has an odd number of hex digits",
                text
            )),
            hex::FromHexError::InvalidHexCharacter { c, index } => SearchError::invalid_pattern(
                format!("'{}' contains non-hex character '{}' at position {}", text, c, index),
            ),
            other => SearchError::invalid_pattern(other.to_string()),
        })?;

        Ok(Self { bytes })
    }

    /// Builds a pattern from raw bytes. Fails on an empty slice.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> SearchResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SearchError::invalid_pattern("pattern is empty"));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl FromStr for Pattern {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Pattern {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(&self.bytes))
    }
}
