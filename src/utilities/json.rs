//! JSON helpers shared by every stage.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading JSON documents
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Removes every line whose first non-blank characters are `//`.
///
/// Benchmark programs use such lines to print values that must not be optimized away.
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a JSON document that may contain `//` comment lines.
pub fn parse_commented<T: DeserializeOwned>(text: &str) -> Result<T, JsonError> {
    Ok(serde_json::from_str(&strip_comment_lines(text))?)
}

/// Reads and parses a JSON document that may contain `//` comment lines.
pub fn read_commented<T: DeserializeOwned>(path: &Path) -> Result<T, JsonError> {
    let text = fs::read_to_string(path).map_err(|source| JsonError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_commented(&text)
}
