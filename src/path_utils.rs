//! Helpers for turning `/`-separated names into filesystem paths.

use std::path::PathBuf;

/// Convert a `/`-separated relative name into a path that cannot escape its base.
///
/// Returns `None` for empty names, absolute names, backslashes, and names with
/// empty, `.` or `..` segments.
pub fn safe_relative_path(name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.starts_with('/') || name.contains('\\') {
        return None;
    }

    let mut path = PathBuf::new();
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains(':') {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}
