//! Diff result structures.

use crate::model::WarningRecord;
use serde::Serialize;

/// How a comparison warning was matched to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same file, line and description
    Exact,
    /// Same file and query with identical surrounding source
    Probable,
}

/// Outcome of reconciling comparison warnings against a baseline.
#[derive(Debug, Clone, Default, Serialize)]
#[must_use]
pub struct DiffResult {
    /// Comparison warnings with no baseline counterpart, in comparison order
    pub new_warnings: Vec<WarningRecord>,
    pub exact_matches: usize,
    pub probable_matches: usize,
}

impl DiffResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any comparison warning is new.
    #[must_use]
    pub fn has_new(&self) -> bool {
        !self.new_warnings.is_empty()
    }

    /// Number of comparison warnings looked at.
    #[must_use]
    pub fn compared(&self) -> usize {
        self.new_warnings.len() + self.exact_matches + self.probable_matches
    }

    pub(crate) fn record(&mut self, record: WarningRecord, matched: Option<MatchKind>) {
        match matched {
            Some(MatchKind::Exact) => self.exact_matches += 1,
            Some(MatchKind::Probable) => self.probable_matches += 1,
            None => self.new_warnings.push(record),
        }
    }
}

/// Per-tool summary of a directory diff.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDiffSummary {
    pub tool: String,
    pub new_warnings: usize,
    pub exact_matches: usize,
    pub probable_matches: usize,
    /// Whether a baseline file existed for this tool
    pub had_baseline: bool,
}

impl ToolDiffSummary {
    pub(crate) fn from_result(tool: &str, result: &DiffResult, had_baseline: bool) -> Self {
        Self {
            tool: tool.to_string(),
            new_warnings: result.new_warnings.len(),
            exact_matches: result.exact_matches,
            probable_matches: result.probable_matches,
            had_baseline,
        }
    }
}
