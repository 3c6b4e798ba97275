/// Entry filtering for the directory walk.
///
/// A hidden entry is one whose file name starts with `.`. The rule is applied
/// to files and directories alike; a skipped directory is not descended into.
use std::ffi::OsStr;

/// Checks whether a file name marks a hidden entry
pub fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

/// Decides whether an entry below the root should be visited
pub fn should_visit(name: &OsStr, follow_hidden: bool) -> bool {
    follow_hidden || !is_hidden(name)
}
