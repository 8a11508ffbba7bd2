//! Source identifier file reader
//!
//! One URI per line. Lines are trimmed, blank lines skipped, and duplicates
//! collapsed keeping the first occurrence, so iteration order follows the file.

use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot read identifier file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read the identifier set from `path`
pub fn read_identifiers(path: &Path) -> Result<IndexSet<String>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let identifiers = parse_identifiers(&content);
    tracing::info!(
        path = %path.display(),
        identifiers = identifiers.len(),
        "Source identifiers loaded"
    );

    Ok(identifiers)
}

/// Identifier set from newline-delimited text
pub fn parse_identifiers(content: &str) -> IndexSet<String> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
