//! Directory filtering: raw results in, one filtered file per tool out.
//!
//! Raw files are grouped into jobs by name. Every `*compiler_raw*` file feeds
//! `compiler.scrub`, every `*p10_raw*` file feeds `p10.scrub`, and anything
//! else feeds the output named after the stem up to its first underscore
//! (`coverity_raw.scrub` becomes `coverity.scrub`).

use super::output::{check_artifact, write_output, OutputTarget};
use super::{worker_pool, PipelineError};
use crate::config::FilterConfig;
use crate::error::ScrubError;
use crate::filter::{
    build_file_list, read_file_set, FileListRules, FilterEngine, FilterPolicy, FilterStats,
    QueryExclusions,
};
use crate::model::WarningRecord;
use crate::parsers::{parse_file, SourceFormat};
use crate::reports::{format_scrub_records, serialize_sarif};
use crate::utils::{paths, SourceTree};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Subdirectory of the output directory that receives SARIF copies.
pub const SARIF_RESULTS_DIR: &str = "sarif_results";

const COMPILER_JOB: &str = "compiler";
const P10_JOB: &str = "p10";

/// Raw files that are filtered together into one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterJob {
    /// Output stem, e.g. `compiler` for `compiler.scrub`
    pub name: String,
    pub inputs: Vec<PathBuf>,
}

/// Result of one successful job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub name: String,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sarif_output: Option<PathBuf>,
    /// Malformed blocks skipped while parsing the inputs
    pub skipped: usize,
    pub stats: FilterStats,
}

/// A job that could not be completed.
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub name: String,
    pub error: String,
}

/// Everything a directory filtering run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterSummary {
    pub jobs: Vec<JobOutcome>,
    pub failed: Vec<JobFailure>,
}

impl FilterSummary {
    /// Warnings kept across all jobs.
    #[must_use]
    pub fn kept(&self) -> usize {
        self.jobs.iter().map(|j| j.stats.kept).sum()
    }
}

/// Output name for a raw results file stem.
fn job_name(stem: &str) -> &str {
    if stem.contains("compiler_raw") {
        COMPILER_JOB
    } else if stem.contains("p10_raw") {
        P10_JOB
    } else {
        stem.split('_').next().unwrap_or(stem)
    }
}

/// Group the `.scrub` and `.sarif` files in `raw_dir` into jobs, sorted by name.
pub fn plan_jobs(raw_dir: &Path) -> std::io::Result<Vec<FilterJob>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in std::fs::read_dir(raw_dir)? {
        let path = entry?.path();
        if !path.is_file() || SourceFormat::from_path(&path).is_none() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!("Skipping raw file with a non UTF-8 name: {}", path.display());
            continue;
        };
        if stem.is_empty() {
            continue;
        }
        groups.entry(job_name(stem).to_string()).or_default().push(path);
    }
    Ok(groups
        .into_iter()
        .map(|(name, mut inputs)| {
            inputs.sort();
            FilterJob { name, inputs }
        })
        .collect())
}

/// Filter every raw results file in `config.raw_dir` into `config.output_dir`.
///
/// A job that fails is logged and recorded in the summary; the other jobs
/// still run.
pub fn filter_directory(config: &FilterConfig) -> Result<FilterSummary> {
    check_artifact(&config.raw_dir, false)?;
    let root = paths::absolute(&config.source_root);

    let policy = FilterPolicy::new()
        .with_excluded_files(load_exclusions(config, &root)?)
        .with_drop_external(!config.filtering.external_warnings)
        .with_micro_filter(config.filtering.micro_filter)
        .with_query_exclusions(load_query_exclusions(config)?);
    let jobs = plan_jobs(&config.raw_dir)
        .with_context(|| format!("Failed to list {}", config.raw_dir.display()))?;
    tracing::info!(
        "Filtering {} result groups from {}",
        jobs.len(),
        config.raw_dir.display()
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let sources = Arc::new(SourceTree::new(&root));

    let run = || -> Vec<(String, Result<JobOutcome>)> {
        jobs.par_iter()
            .map(|job| (job.name.clone(), run_job(job, config, &sources, &policy)))
            .collect()
    };
    let results = match worker_pool(config.behavior.workers)? {
        Some(pool) => pool.install(run),
        None => run(),
    };

    let mut summary = FilterSummary::default();
    for (name, result) in results {
        match result {
            Ok(outcome) => summary.jobs.push(outcome),
            Err(e) => {
                tracing::warn!("Could not generate output for {}: {:#}", name, e);
                summary.failed.push(JobFailure {
                    name,
                    error: format!("{e:#}"),
                });
            }
        }
    }
    Ok(summary)
}

fn load_exclusions(config: &FilterConfig, root: &Path) -> Result<HashSet<PathBuf>> {
    if let Some(list) = &config.filtering.exclusion_list_file {
        return read_file_set(list)
            .with_context(|| format!("Failed to read exclusion list {}", list.display()));
    }
    if let Some(rules_file) = &config.filtering.rules_file {
        let rules = FileListRules::load(rules_file)
            .with_context(|| format!("Failed to read filtering rules {}", rules_file.display()))?;
        return Ok(build_file_list(root, &rules, None).exclusion_set());
    }
    Ok(HashSet::new())
}

fn load_query_exclusions(config: &FilterConfig) -> Result<QueryExclusions> {
    match &config.filtering.query_exclusions_file {
        Some(path) => QueryExclusions::load(path)
            .with_context(|| format!("Failed to read query exclusions {}", path.display())),
        None => Ok(QueryExclusions::new()),
    }
}

fn run_job(
    job: &FilterJob,
    config: &FilterConfig,
    sources: &Arc<SourceTree>,
    policy: &FilterPolicy,
) -> Result<JobOutcome> {
    let root = sources.root();
    let mut records: Vec<WarningRecord> = Vec::new();
    let mut skipped = 0;
    for input in &job.inputs {
        let format = SourceFormat::from_path(input).unwrap_or(SourceFormat::Scrub);
        let parsed = parse_file(input, format, root).map_err(|e| PipelineError::ParseFailed {
            path: input.display().to_string(),
            source: ScrubError::from(e).into(),
        })?;
        skipped += parsed.issues.len();
        records.extend(parsed.records);
    }

    let mut policy = policy.clone();
    if job.name == P10_JOB {
        policy = policy.with_directive_name(P10_JOB);
    }
    let outcome = FilterEngine::with_sources(Arc::clone(sources), policy).filter(records);

    let output = config.output_dir.join(format!("{}.scrub", job.name));
    write_output(
        &format_scrub_records(&outcome.records),
        &OutputTarget::File(output.clone()),
        true,
    )
    .map_err(|source| PipelineError::FilterFailed {
        job: job.name.clone(),
        source,
    })?;

    let sarif_output = if config.output.write_sarif {
        let path = config
            .output_dir
            .join(SARIF_RESULTS_DIR)
            .join(format!("{}.sarif", job.name));
        let tool = outcome
            .records
            .first()
            .map_or(job.name.as_str(), |r| r.tool.as_str());
        let text = serialize_sarif(&outcome.records, config.output.sarif_version, root, tool)
            .map_err(ScrubError::from)?;
        write_output(&text, &OutputTarget::File(path.clone()), true)?;
        Some(path)
    } else {
        None
    };

    tracing::info!(
        "{}: kept {} of {} warnings -> {}",
        job.name,
        outcome.stats.kept,
        outcome.stats.input,
        output.display()
    );
    Ok(JobOutcome {
        name: job.name.clone(),
        output,
        sarif_output,
        skipped,
        stats: outcome.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BehaviorConfig, FilteringConfig, OutputConfig};

    fn touch(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_job_name() {
        assert_eq!(job_name("gcc_compiler_raw"), "compiler");
        assert_eq!(job_name("javac_compiler_raw"), "compiler");
        assert_eq!(job_name("p10_raw"), "p10");
        assert_eq!(job_name("coverity_raw"), "coverity");
        assert_eq!(job_name("pylint"), "pylint");
    }

    #[test]
    fn test_plan_jobs_groups_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "gcc_compiler_raw.scrub",
            "javac_compiler_raw.scrub",
            "coverity_raw.sarif",
            "p10_raw.scrub",
            "notes.txt",
        ] {
            touch(&dir.path().join(name), "");
        }
        let jobs = plan_jobs(dir.path()).unwrap();
        let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["compiler", "coverity", "p10"]);
        assert_eq!(jobs[0].inputs.len(), 2);
    }

    #[test]
    fn test_filter_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let raw = dir.path().join("raw");
        let out = dir.path().join("out");
        touch(&src.join("a.c"), "int a;\nint b; // scrub_ignore_warning p10\n");
        touch(&src.join("gen/g.c"), "int g;\n");
        touch(&raw.join("gcc_compiler_raw.scrub"),
            "gcc001 <Low> :a.c:1: -Wunused\n    Unused a.\n\ngcc002 <Low> :gen/g.c:1: -Wunused\n    Unused g.\n\n");
        touch(&raw.join("p10_raw.scrub"), "p10001 <Low> :a.c:2: rule1\n    Rule one.\n\n");
        let excluded = dir.path().join("excluded.txt");
        touch(&excluded, "gen/g.c\n");

        let config = FilterConfig {
            raw_dir: raw,
            output_dir: out.clone(),
            source_root: src,
            filtering: FilteringConfig {
                exclusion_list_file: Some(excluded),
                ..FilteringConfig::default()
            },
            output: OutputConfig::default(),
            behavior: BehaviorConfig {
                workers: Some(2),
                ..BehaviorConfig::default()
            },
        };
        let summary = filter_directory(&config).unwrap();
        assert!(summary.failed.is_empty());
        assert_eq!(summary.jobs.len(), 2);
        assert_eq!(summary.kept(), 1);

        let compiler = std::fs::read_to_string(out.join("compiler.scrub")).unwrap();
        assert_eq!(compiler, "gcc001 <Low> :a.c:1: -Wunused\n    Unused a.\n\n");
        assert_eq!(std::fs::read_to_string(out.join("p10.scrub")).unwrap(), "");
        assert!(out.join(SARIF_RESULTS_DIR).join("compiler.sarif").is_file());
    }

    #[test]
    fn test_bad_job_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let raw = dir.path().join("raw");
        touch(&src.join("a.c"), "int a;\n");
        touch(&raw.join("coverity_raw.sarif"), "{ not json");
        touch(&raw.join("gcc_raw.scrub"), "gcc001 <Low> :a.c:1: q\n    d\n\n");

        let config = FilterConfig {
            raw_dir: raw,
            output_dir: dir.path().join("out"),
            source_root: src,
            filtering: FilteringConfig::default(),
            output: OutputConfig {
                write_sarif: false,
                ..OutputConfig::default()
            },
            behavior: BehaviorConfig::default(),
        };
        let summary = filter_directory(&config).unwrap();
        assert_eq!(summary.jobs.len(), 1);
        assert_eq!(summary.jobs[0].name, "gcc");
        assert!(summary.jobs[0].sarif_output.is_none());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].name, "coverity");
    }
}
