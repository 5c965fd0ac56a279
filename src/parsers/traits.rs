//! Parser trait definitions and error types.
//!
//! Parsers distinguish two kinds of failure. A [`ParseError`] stops the whole
//! file. A [`ParseIssue`] describes one malformed block; it is collected
//! alongside the records that did parse and the rest of the file continues.

use crate::model::WarningRecord;
use std::path::Path;
use thiserror::Error;

/// File-level errors that stop a parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(String),

    #[error("Unknown results format: {0}")]
    UnknownFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Analysis did not complete successfully: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

/// A block or result that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based line of the block header, or the result index for JSON inputs
    pub line: usize,
    /// Header text (or a short excerpt) of the skipped entry
    pub header: String,
    pub reason: String,
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.reason, self.header)
    }
}

/// Records produced by one parse call plus everything that was skipped.
#[derive(Debug, Clone, Default)]
pub struct ParsedWarnings {
    pub records: Vec<WarningRecord>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedWarnings {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a skipped entry and log it.
    pub fn skip(&mut self, line: usize, header: impl Into<String>, reason: impl Into<String>) {
        let issue = ParseIssue {
            line,
            header: header.into(),
            reason: reason.into(),
        };
        tracing::warn!("Skipping malformed warning at {}", issue);
        self.issues.push(issue);
    }

    #[must_use]
    pub fn into_records(self) -> Vec<WarningRecord> {
        self.records
    }
}

/// Trait for result-format parsers.
///
/// Implementors provide `parse_str`; relative paths in the input resolve
/// against `source_root`.
pub trait WarningParser: Send + Sync {
    /// Parse results from a file. Invalid UTF-8 is replaced, not rejected.
    fn parse(&self, path: &Path, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let bytes = std::fs::read(path)?;
        self.parse_str(&String::from_utf8_lossy(&bytes), source_root)
    }

    /// Parse results from string content.
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError>;

    /// Human-readable format name
    fn format_name(&self) -> &str;
}
