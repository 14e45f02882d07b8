//! Import file discovery
//!
//! Finds the query exports to load: files matching a glob pattern inside
//! the input directory, minus any the exporter marked as errors.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Default file name pattern of Manus DB query exports
pub const DEFAULT_PATTERN: &str = "db-query-*.json";

/// Default marker in the file name of failed query exports
pub const DEFAULT_ERROR_MARKER: &str = "error";

/// Discover import files in a directory.
///
/// Returns regular files matching `pattern` whose file name does not
/// contain `error_marker`, sorted by path.
pub fn discover_files(dir: &Path, pattern: &str, error_marker: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    tracing::debug!("Discovering import files with pattern {}", full_pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&full_pattern)? {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                if is_error_marked(&path, error_marker) {
                    tracing::debug!("Skipping error export {}", path.display());
                    continue;
                }
                files.push(path);
            }
            Err(e) => {
                tracing::warn!("Error accessing path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Check whether a file name carries the error marker
pub fn is_error_marked(path: &Path, error_marker: &str) -> bool {
    if error_marker.is_empty() {
        return false;
    }
    path.file_name()
        .map(|name| name.to_string_lossy().contains(error_marker))
        .unwrap_or(false)
}

/// File stem used to key per-file tallies
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
