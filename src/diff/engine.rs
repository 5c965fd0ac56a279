//! Baseline/comparison reconciliation.

use super::{DiffResult, MatchKind};
use crate::model::WarningRecord;
use crate::utils::{paths, SourceTree};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Finds the comparison warnings that are new relative to a baseline.
///
/// Each side has its own source tree; files are compared root-relative so
/// the two trees may live in different checkouts.
pub struct DiffEngine {
    baseline_sources: Arc<SourceTree>,
    comparison_sources: Arc<SourceTree>,
    probable_matching: bool,
}

impl DiffEngine {
    /// Create an engine for two source roots.
    #[must_use]
    pub fn new(baseline_root: &Path, comparison_root: &Path) -> Self {
        Self::with_sources(
            Arc::new(SourceTree::new(baseline_root)),
            Arc::new(SourceTree::new(comparison_root)),
        )
    }

    /// Create an engine over existing source caches.
    #[must_use]
    pub fn with_sources(baseline: Arc<SourceTree>, comparison: Arc<SourceTree>) -> Self {
        Self {
            baseline_sources: baseline,
            comparison_sources: comparison,
            probable_matching: true,
        }
    }

    /// Enable or disable context-window matching (on by default).
    #[must_use]
    pub const fn with_probable_matching(mut self, enabled: bool) -> Self {
        self.probable_matching = enabled;
        self
    }

    /// Reconcile `comparison` against `baseline`.
    pub fn diff(&self, baseline: &[WarningRecord], comparison: &[WarningRecord]) -> DiffResult {
        let index = BaselineIndex::build(baseline, self.baseline_sources.root());
        let root = self.comparison_sources.root();

        let verdicts: Vec<(WarningRecord, Option<MatchKind>)> = comparison
            .par_iter()
            .map(|record| {
                let record = relative(record, root);
                let matched = self.classify(&index, &record);
                if let Some(kind) = matched {
                    tracing::debug!("{} matches baseline ({:?})", record.id, kind);
                }
                (record, matched)
            })
            .collect();

        let mut result = DiffResult::new();
        for (record, matched) in verdicts {
            result.record(record, matched);
        }
        tracing::info!(
            "Diff: {} new, {} exact matches, {} probable matches",
            result.new_warnings.len(),
            result.exact_matches,
            result.probable_matches
        );
        result
    }

    fn classify(&self, index: &BaselineIndex, record: &WarningRecord) -> Option<MatchKind> {
        if index.exact.contains(&ExactKey::of(record)) {
            return Some(MatchKind::Exact);
        }
        if !self.probable_matching {
            return None;
        }
        let lines = index
            .by_query
            .get(&(record.file.clone(), record.query.clone()))?;
        let window = self
            .comparison_sources
            .context_window(&record.file, record.line)?;
        lines
            .iter()
            .any(|&line| {
                self.baseline_sources
                    .context_window(&record.file, line)
                    .is_some_and(|other| other == window)
            })
            .then_some(MatchKind::Probable)
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ExactKey {
    file: PathBuf,
    line: u32,
    description: Vec<String>,
}

impl ExactKey {
    fn of(record: &WarningRecord) -> Self {
        Self {
            file: record.file.clone(),
            line: record.line,
            description: record.description.clone(),
        }
    }
}

struct BaselineIndex {
    exact: HashSet<ExactKey>,
    /// Baseline lines per `(file, query)`
    by_query: HashMap<(PathBuf, Option<String>), Vec<u32>>,
}

impl BaselineIndex {
    fn build(baseline: &[WarningRecord], root: &Path) -> Self {
        let mut exact = HashSet::with_capacity(baseline.len());
        let mut by_query: HashMap<_, Vec<u32>> = HashMap::new();
        for record in baseline {
            let record = relative(record, root);
            by_query
                .entry((record.file.clone(), record.query.clone()))
                .or_default()
                .push(record.line);
            exact.insert(ExactKey::of(&record));
        }
        Self { exact, by_query }
    }
}

fn relative(record: &WarningRecord, root: &Path) -> WarningRecord {
    let mut record = record.clone();
    record.file = paths::relativize(&paths::resolve(&record.file, root), root);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(lines: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.c"), lines.join("\n")).unwrap();
        dir
    }

    fn warning(id: &str, line: u32, query: &str, text: &str) -> WarningRecord {
        WarningRecord::new(id, "src/a.c", line, vec![text.to_string()]).with_query(query)
    }

    fn source(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("stmt_{i};")).collect()
    }

    #[test]
    fn test_identical_sets_have_no_new_warnings() {
        let dir = tree(&["a", "b", "c"]);
        let set = vec![warning("cov001", 1, "Q", "x"), warning("cov002", 2, "Q", "y")];
        let result = DiffEngine::new(dir.path(), dir.path()).diff(&set, &set);
        assert!(!result.has_new());
        assert_eq!(result.exact_matches, 2);
    }

    #[test]
    fn test_shifted_warning_is_probable_match() {
        let base_lines = source(60);
        let mut shifted = vec!["// a".to_string(), "// b".to_string(), "// c".to_string()];
        shifted.extend(base_lines.iter().cloned());
        let base = tree(&base_lines.iter().map(String::as_str).collect::<Vec<_>>());
        let comp = tree(&shifted.iter().map(String::as_str).collect::<Vec<_>>());

        let baseline = vec![warning("cov001", 42, "NULL_DEREF", "p may be null")];
        let comparison = vec![warning("cov001", 45, "NULL_DEREF", "p may be null")];
        let result = DiffEngine::new(base.path(), comp.path()).diff(&baseline, &comparison);
        assert!(!result.has_new());
        assert_eq!(result.probable_matches, 1);

        let strict = DiffEngine::new(base.path(), comp.path())
            .with_probable_matching(false)
            .diff(&baseline, &comparison);
        assert_eq!(strict.new_warnings.len(), 1);
    }

    #[test]
    fn test_changed_context_is_new() {
        let base = tree(&["a", "b", "c", "d"]);
        let comp = tree(&["a", "B", "c", "d"]);
        let baseline = vec![warning("cov001", 2, "Q", "x")];
        let comparison = vec![warning("cov001", 2, "Q", "changed text")];
        let result = DiffEngine::new(base.path(), comp.path()).diff(&baseline, &comparison);
        assert_eq!(result.new_warnings.len(), 1);
    }

    #[test]
    fn test_different_query_is_new_even_with_same_context() {
        let dir = tree(&["a", "b", "c"]);
        let baseline = vec![warning("cov001", 2, "Q1", "x")];
        let comparison = vec![warning("cov001", 2, "Q2", "y")];
        let result = DiffEngine::new(dir.path(), dir.path()).diff(&baseline, &comparison);
        assert_eq!(result.new_warnings.len(), 1);
    }

    #[test]
    fn test_missing_source_keeps_record() {
        let base = TempDir::new().unwrap();
        let comp = TempDir::new().unwrap();
        let baseline = vec![warning("cov001", 2, "Q", "x")];
        let comparison = vec![warning("cov001", 3, "Q", "x")];
        let result = DiffEngine::new(base.path(), comp.path()).diff(&baseline, &comparison);
        assert_eq!(result.new_warnings.len(), 1);
    }

    #[test]
    fn test_absolute_paths_compare_relative_and_order_is_kept() {
        let base = tree(&["a", "b", "c"]);
        let comp = tree(&["x", "y", "z"]);
        let baseline = vec![WarningRecord::new("gcc001", base.path().join("src/a.c"), 1, vec!["d".into()])];
        let comparison: Vec<_> = (1..=3)
            .map(|i| WarningRecord::new(format!("gcc{i:03}"), comp.path().join("src/a.c"), 1, vec![format!("d{i}")]))
            .chain(std::iter::once(WarningRecord::new("gcc004", comp.path().join("src/a.c"), 1, vec!["d".into()])))
            .collect();
        let result = DiffEngine::new(base.path(), comp.path()).diff(&baseline, &comparison);
        let ids: Vec<_> = result.new_warnings.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["gcc001", "gcc002", "gcc003"]);
        assert_eq!(result.new_warnings[0].file, PathBuf::from("src/a.c"));
        assert_eq!(result.exact_matches, 1);
    }
}
