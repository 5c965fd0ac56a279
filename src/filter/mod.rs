//! Warning filtering.
//!
//! A record survives the [`FilterEngine`] only when every check passes:
//!
//! 1. its root-relative file is not in the exclusion set
//! 2. when external warnings are dropped, its file lies under the source root
//! 3. when micro-filtering is on, its source line carries no suppression
//!    directive naming the tool (see [`suppression`])
//! 4. its `(tool, query)` pair is not excluded (see [`QueryExclusions`])
//!
//! Survivors are rewritten relative to the source root. Running the engine
//! over its own output changes nothing.

pub mod file_list;
mod queries;
pub mod suppression;

pub use file_list::{build_file_list, read_file_set, FileListRules, FileSelection};
pub use queries::QueryExclusions;
pub use suppression::ToolAliases;

use crate::model::{CodeFlowStep, WarningRecord};
use crate::utils::{paths, SourceTree};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to filter out.
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    /// Root-relative files whose warnings are dropped
    pub excluded_files: HashSet<PathBuf>,
    /// Drop warnings in files outside the source root
    pub drop_external: bool,
    /// Honor inline suppression directives
    pub micro_filter: bool,
    pub query_exclusions: QueryExclusions,
    /// Additional names accepted in directives, e.g. the output name `p10`
    pub extra_directive_names: Vec<String>,
}

impl FilterPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_excluded_files(mut self, files: HashSet<PathBuf>) -> Self {
        self.excluded_files = files.iter().map(|f| paths::normalize(f)).collect();
        self
    }

    #[must_use]
    pub const fn with_drop_external(mut self, drop: bool) -> Self {
        self.drop_external = drop;
        self
    }

    #[must_use]
    pub const fn with_micro_filter(mut self, enabled: bool) -> Self {
        self.micro_filter = enabled;
        self
    }

    #[must_use]
    pub fn with_query_exclusions(mut self, exclusions: QueryExclusions) -> Self {
        self.query_exclusions = exclusions;
        self
    }

    #[must_use]
    pub fn with_directive_name(mut self, name: impl Into<String>) -> Self {
        self.extra_directive_names.push(name.into().to_lowercase());
        self
    }
}

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    ExcludedFile,
    External,
    Suppressed,
    ExcludedQuery,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExcludedFile => "excluded file",
            Self::External => "outside source root",
            Self::Suppressed => "inline suppression",
            Self::ExcludedQuery => "excluded query",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-check drop counts for one filtering run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub input: usize,
    pub kept: usize,
    pub excluded_file: usize,
    pub external: usize,
    pub suppressed: usize,
    pub excluded_query: usize,
}

impl FilterStats {
    fn count(&mut self, reason: DropReason) {
        match reason {
            DropReason::ExcludedFile => self.excluded_file += 1,
            DropReason::External => self.external += 1,
            DropReason::Suppressed => self.suppressed += 1,
            DropReason::ExcludedQuery => self.excluded_query += 1,
        }
    }

    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.input - self.kept
    }
}

/// Surviving records plus statistics.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub records: Vec<WarningRecord>,
    pub stats: FilterStats,
}

/// Applies a [`FilterPolicy`] to records from one source tree.
pub struct FilterEngine {
    policy: FilterPolicy,
    aliases: ToolAliases,
    sources: Arc<SourceTree>,
}

impl FilterEngine {
    #[must_use]
    pub fn new(source_root: &Path, policy: FilterPolicy) -> Self {
        Self::with_sources(Arc::new(SourceTree::new(source_root)), policy)
    }

    /// Share an existing source cache, e.g. across worker threads.
    #[must_use]
    pub fn with_sources(sources: Arc<SourceTree>, policy: FilterPolicy) -> Self {
        Self {
            policy,
            aliases: ToolAliases::with_builtins(),
            sources,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        self.sources.root()
    }

    /// Filter `records`, keeping input order.
    #[must_use]
    pub fn filter(&self, records: Vec<WarningRecord>) -> FilterOutcome {
        let mut stats = FilterStats {
            input: records.len(),
            ..FilterStats::default()
        };
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            match self.check(&record) {
                Some(reason) => {
                    tracing::debug!(
                        "Dropped {} ({}:{}): {}",
                        record.id,
                        record.file.display(),
                        record.line,
                        reason
                    );
                    stats.count(reason);
                }
                None => kept.push(self.relativize(record)),
            }
        }
        stats.kept = kept.len();
        tracing::info!(
            "Filtered {} warnings: {} kept, {} dropped",
            stats.input,
            stats.kept,
            stats.dropped()
        );
        FilterOutcome {
            records: kept,
            stats,
        }
    }

    /// The first check that rejects `record`, if any.
    #[must_use]
    pub fn check(&self, record: &WarningRecord) -> Option<DropReason> {
        let root = self.sources.root();
        let absolute = paths::resolve(&record.file, root);
        let relative = paths::relativize(&absolute, root);

        if self.policy.excluded_files.contains(&relative) {
            return Some(DropReason::ExcludedFile);
        }
        if self.policy.drop_external && !paths::is_within(&absolute, root) {
            return Some(DropReason::External);
        }
        if self.policy.micro_filter && self.is_suppressed(&absolute, record) {
            return Some(DropReason::Suppressed);
        }
        if let Some(query) = record.query.as_deref() {
            if self
                .policy
                .query_exclusions
                .excludes(&record.tool, query, &self.aliases)
            {
                return Some(DropReason::ExcludedQuery);
            }
        }
        None
    }

    fn is_suppressed(&self, file: &Path, record: &WarningRecord) -> bool {
        let Some(line) = self.sources.line(file, record.source_line()) else {
            return false;
        };
        suppression::suppresses(
            &line,
            &record.tool,
            &self.aliases,
            &self.policy.extra_directive_names,
        )
    }

    fn relativize(&self, mut record: WarningRecord) -> WarningRecord {
        let root = self.sources.root();
        let trimmed = paths::to_slash(root);
        let trimmed = trimmed.trim_end_matches('/');
        record.file = relative_file(&record.file, root);
        // A filesystem root has no prefix worth stripping.
        if !trimmed.is_empty() {
            let prefix = format!("{trimmed}/");
            for line in &mut record.description {
                if line.contains(&prefix) {
                    *line = line.replace(&prefix, "");
                }
            }
        }
        for step in &mut record.code_flow {
            *step = CodeFlowStep {
                file: relative_file(&step.file, root),
                ..step.clone()
            };
        }
        record
    }
}

fn relative_file(file: &Path, root: &Path) -> PathBuf {
    paths::relativize(&paths::resolve(file, root), root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("generated")).unwrap();
        let mut bar = String::new();
        for i in 1..=12 {
            if i == 10 {
                bar.push_str("p = NULL; // scrub_ignore_warning coverity\n");
            } else {
                bar.push_str(&format!("line {i}\n"));
            }
        }
        fs::write(src.join("bar.c"), bar).unwrap();
        fs::write(src.join("generated/foo.c"), "int x;\n").unwrap();
        dir
    }

    fn record(id: &str, root: &Path, file: &str, line: u32) -> WarningRecord {
        WarningRecord::new(id, root.join(file), line, vec![format!("see {}", root.join(file).display())])
    }

    #[test]
    fn test_exclusion_set_always_applies() {
        let dir = setup();
        let policy = FilterPolicy::new()
            .with_excluded_files(HashSet::from([PathBuf::from("src/generated/foo.c")]));
        let engine = FilterEngine::new(dir.path(), policy);
        let out = engine.filter(vec![
            record("gcc001", dir.path(), "src/generated/foo.c", 1),
            record("gcc002", dir.path(), "src/bar.c", 1),
        ]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].id, "gcc002");
        assert_eq!(out.stats.excluded_file, 1);
    }

    #[test]
    fn test_micro_filter_is_tool_specific() {
        let dir = setup();
        let engine = FilterEngine::new(dir.path(), FilterPolicy::new().with_micro_filter(true));
        let out = engine.filter(vec![
            record("coverity001", dir.path(), "src/bar.c", 10),
            record("gcc001", dir.path(), "src/bar.c", 10),
            record("coverity002", dir.path(), "src/bar.c", 9),
        ]);
        let ids: Vec<_> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["gcc001", "coverity002"]);
        assert_eq!(out.stats.suppressed, 1);
    }

    #[test]
    fn test_extra_directive_name() {
        let dir = setup();
        fs::write(dir.path().join("src/p.c"), "x; // @suppress p10\n").unwrap();
        let policy = FilterPolicy::new().with_micro_filter(true).with_directive_name("P10");
        let out = FilterEngine::new(dir.path(), policy)
            .filter(vec![record("p10001", dir.path(), "src/p.c", 1)]);
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_micro_filter_keeps_when_source_missing() {
        let dir = setup();
        let engine = FilterEngine::new(dir.path(), FilterPolicy::new().with_micro_filter(true));
        let out = engine.filter(vec![record("coverity001", dir.path(), "src/gone.c", 10)]);
        assert_eq!(out.records.len(), 1);
    }

    #[test]
    fn test_external_policy() {
        let dir = setup();
        let outside = WarningRecord::new("gcc001", "/usr/include/stdio.h", 3, vec!["d".into()]);
        let keep = FilterEngine::new(dir.path(), FilterPolicy::new()).filter(vec![outside.clone()]);
        assert_eq!(keep.records[0].file, PathBuf::from("/usr/include/stdio.h"));
        let drop = FilterEngine::new(dir.path(), FilterPolicy::new().with_drop_external(true))
            .filter(vec![outside]);
        assert!(drop.records.is_empty());
        assert_eq!(drop.stats.external, 1);
    }

    #[test]
    fn test_query_exclusion_with_alias() {
        let dir = setup();
        let policy = FilterPolicy::new()
            .with_query_exclusions(QueryExclusions::parse("compiler: -Wunused-variable\n"));
        let engine = FilterEngine::new(dir.path(), policy);
        let out = engine.filter(vec![
            record("gcc001", dir.path(), "src/bar.c", 1).with_query("-Wunused-variable"),
            record("gcc002", dir.path(), "src/bar.c", 2).with_query("-Wshadow"),
        ]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.stats.excluded_query, 1);
    }

    #[test]
    fn test_survivors_are_relative_and_idempotent() {
        let dir = setup();
        let rec = record("gcc001", dir.path(), "src/bar.c", 3).with_code_flow(vec![
            CodeFlowStep::new(dir.path().join("src/bar.c"), 2, "step"),
        ]);
        let policy = FilterPolicy::new().with_micro_filter(true).with_drop_external(true);
        let engine = FilterEngine::new(dir.path(), policy);
        let once = engine.filter(vec![rec]);
        let r = &once.records[0];
        assert_eq!(r.file, PathBuf::from("src/bar.c"));
        assert_eq!(r.description[0], "see src/bar.c");
        assert_eq!(r.code_flow[0].file, PathBuf::from("src/bar.c"));

        let twice = engine.filter(once.records.clone());
        assert_eq!(twice.records, once.records);
    }

    #[test]
    fn test_filesystem_root_keeps_description_slashes() {
        let rec = WarningRecord::new("gcc001", "/opt/app/main.c", 4, vec!["see opt/app and a/b".into()]);
        let out = FilterEngine::new(Path::new("/"), FilterPolicy::new()).filter(vec![rec]);
        assert_eq!(out.records[0].file, PathBuf::from("opt/app/main.c"));
        assert_eq!(out.records[0].description, vec!["see opt/app and a/b"]);
    }

    #[test]
    fn test_removing_exclusion_restores_record() {
        let dir = setup();
        let rec = record("gcc001", dir.path(), "src/bar.c", 1);
        let excluded = FilterPolicy::new()
            .with_excluded_files(HashSet::from([PathBuf::from("src/bar.c")]));
        assert!(FilterEngine::new(dir.path(), excluded)
            .filter(vec![rec.clone()])
            .records
            .is_empty());
        assert_eq!(
            FilterEngine::new(dir.path(), FilterPolicy::new()).filter(vec![rec]).records.len(),
            1
        );
    }
}
