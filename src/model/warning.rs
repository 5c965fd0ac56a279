//! Canonical warning records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Priority assigned to a warning.
///
/// Unrecognized labels and ranks never fail; they collapse to [`Priority::Low`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    Med,
    High,
}

impl Priority {
    /// Label used in SCRUB headers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Med => "Med",
            Self::High => "High",
        }
    }

    /// Lenient conversion from a header label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Map a SARIF `rank` value onto a priority.
    ///
    /// Fractional ranks are truncated first, so 21.5 counts as 21.
    #[must_use]
    pub fn from_rank(rank: f64) -> Self {
        let rank = rank.trunc();
        if rank > 56.0 {
            Self::High
        } else if rank > 21.0 {
            Self::Med
        } else {
            Self::Low
        }
    }

    /// Representative SARIF `rank` that maps back onto this priority.
    #[must_use]
    pub const fn sarif_rank(&self) -> Option<f64> {
        match self {
            Self::Low => None,
            Self::Med => Some(40.0),
            Self::High => Some(80.0),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "med" | "medium" => Ok(Self::Med),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// One step in the execution path leading to a warning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeFlowStep {
    pub file: PathBuf,
    pub line: u32,
    pub description: String,
}

impl CodeFlowStep {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: u32, description: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            description: description.into(),
        }
    }
}

/// A single normalized finding from any analyzer.
///
/// `file` is absolute right after parsing and root-relative once the
/// filtering stage has run. `description` always has at least one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Tool prefix plus zero-padded sequence, e.g. `gcc003`
    pub id: String,
    pub file: PathBuf,
    /// 0 marks a file-level finding
    pub line: u32,
    pub description: Vec<String>,
    /// Lower-case tool name
    pub tool: String,
    pub priority: Priority,
    /// Rule or checker identifier, absent when the tool reports none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub suppressed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_flow: Vec<CodeFlowStep>,
}

impl WarningRecord {
    /// Create a record with the required fields; optional ones start empty.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
        description: Vec<String>,
    ) -> Self {
        let id = id.into();
        let tool = tool_from_id(&id);
        Self {
            id,
            file: file.into(),
            line,
            description,
            tool,
            priority: Priority::Low,
            query: None,
            suppressed: false,
            code_flow: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into().to_lowercase();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the query; an empty string means "no query".
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    #[must_use]
    pub const fn with_suppressed(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    #[must_use]
    pub fn with_code_flow(mut self, steps: Vec<CodeFlowStep>) -> Self {
        self.code_flow = steps;
        self
    }

    /// Query text, or the empty string.
    #[must_use]
    pub fn query_str(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }

    /// Line used when reading source text; file-level findings point at line 1.
    #[must_use]
    pub const fn source_line(&self) -> u32 {
        if self.line == 0 {
            1
        } else {
            self.line
        }
    }
}

/// Derive the tool name from an id by dropping its digits.
#[must_use]
pub fn tool_from_id(id: &str) -> String {
    id.chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .to_lowercase()
}

/// Build an id from a tool name and a sequence number.
#[must_use]
pub fn format_id(tool: &str, sequence: usize) -> String {
    format!("{tool}{sequence:03}")
}

/// Explicit per-file warning counter.
///
/// Each parse call owns one; numbering starts at 1 and only advances when a
/// record is actually produced.
#[derive(Debug, Clone)]
pub struct IdSequence {
    tool: String,
    next: usize,
}

impl IdSequence {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            next: 1,
        }
    }

    /// Issue the next id.
    pub fn next_id(&mut self) -> String {
        let id = format_id(&self.tool, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_mapping() {
        assert_eq!(Priority::from_rank(57.0), Priority::High);
        assert_eq!(Priority::from_rank(56.0), Priority::Med);
        assert_eq!(Priority::from_rank(22.0), Priority::Med);
        assert_eq!(Priority::from_rank(21.0), Priority::Low);
        assert_eq!(Priority::from_rank(21.5), Priority::Low);
        assert_eq!(Priority::from_rank(56.9), Priority::Med);
        assert_eq!(Priority::from_rank(57.2), Priority::High);
        assert_eq!(Priority::from_rank(-1.0), Priority::Low);
    }

    #[test]
    fn test_sarif_rank_round_trips() {
        for p in [Priority::Low, Priority::Med, Priority::High] {
            assert_eq!(p.sarif_rank().map_or(Priority::Low, Priority::from_rank), p);
        }
    }

    #[test]
    fn test_priority_unknown_label_defaults_low() {
        assert_eq!(Priority::from_label("Critical"), Priority::Low);
        assert_eq!(Priority::from_label("High"), Priority::High);
        assert_eq!(Priority::from_label("med"), Priority::Med);
    }

    #[test]
    fn test_tool_from_id() {
        assert_eq!(tool_from_id("gcc003"), "gcc");
        assert_eq!(tool_from_id("coverity120"), "coverity");
        assert_eq!(tool_from_id("P10001"), "p");
    }

    #[test]
    fn test_id_sequence_pads_and_counts() {
        let mut seq = IdSequence::new("semgrep");
        assert_eq!(seq.next_id(), "semgrep001");
        assert_eq!(seq.next_id(), "semgrep002");
        let mut wide = IdSequence::new("x");
        for _ in 0..999 {
            wide.next_id();
        }
        assert_eq!(wide.next_id(), "x1000");
    }

    #[test]
    fn test_empty_query_is_none() {
        let w = WarningRecord::new("gcc001", "/src/a.c", 1, vec!["d".into()]).with_query("");
        assert_eq!(w.query, None);
        assert_eq!(w.query_str(), "");
        assert_eq!(w.tool, "gcc");
    }

    #[test]
    fn test_source_line_for_file_level() {
        let w = WarningRecord::new("gcc001", "/src/a.c", 0, vec!["d".into()]);
        assert_eq!(w.source_line(), 1);
    }
}
