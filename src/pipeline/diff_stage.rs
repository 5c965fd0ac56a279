//! Directory diff: new warnings per tool between two filtered result sets.

use super::output::{write_output, OutputTarget};
use super::{worker_pool, PipelineError};
use crate::config::DiffConfig;
use crate::diff::{DiffEngine, ToolDiffSummary};
use crate::error::ScrubError;
use crate::model::WarningRecord;
use crate::parsers::{parse_file, SourceFormat};
use crate::reports::format_scrub_records;
use crate::utils::SourceTree;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DIFF_SUFFIX: &str = "_diff";

/// Diff every `<tool>.scrub` in the comparison directory against the
/// same-named baseline file and write `<tool>_diff.scrub` files.
///
/// A tool without a baseline file is diffed against nothing, so all of its
/// warnings are new.
pub fn diff_directories(config: &DiffConfig) -> Result<Vec<ToolDiffSummary>> {
    let tools = comparison_tools(&config.comparison_dir)
        .with_context(|| format!("Failed to list {}", config.comparison_dir.display()))?;
    tracing::info!(
        "Diffing {} tools: {} against {}",
        tools.len(),
        config.comparison_dir.display(),
        config.baseline_dir.display()
    );

    let engine = DiffEngine::with_sources(
        Arc::new(SourceTree::new(&config.baseline_root)),
        Arc::new(SourceTree::new(&config.comparison_root)),
    )
    .with_probable_matching(config.settings.probable_matching);
    let pool = worker_pool(config.behavior.workers)?;

    let mut summaries = Vec::with_capacity(tools.len());
    for (tool, comparison_file) in tools {
        let comparison = load(&comparison_file, &config.comparison_root)?;
        let baseline_file = config.baseline_dir.join(format!("{tool}.scrub"));
        let had_baseline = baseline_file.is_file();
        let baseline = if had_baseline {
            load(&baseline_file, &config.baseline_root)?
        } else {
            tracing::warn!("No baseline results for {}; every warning is new", tool);
            Vec::new()
        };

        let result = match &pool {
            Some(pool) => pool.install(|| engine.diff(&baseline, &comparison)),
            None => engine.diff(&baseline, &comparison),
        };
        let output = config.output_dir.join(format!("{tool}{DIFF_SUFFIX}.scrub"));
        write_output(
            &format_scrub_records(&result.new_warnings),
            &OutputTarget::File(output.clone()),
            config.behavior.quiet,
        )
        .map_err(|source| PipelineError::DiffFailed { source })?;

        tracing::info!(
            "{}: {} new, {} exact matches, {} probable matches",
            tool,
            result.new_warnings.len(),
            result.exact_matches,
            result.probable_matches
        );
        summaries.push(ToolDiffSummary::from_result(&tool, &result, had_baseline));
    }
    Ok(summaries)
}

/// `(tool, path)` for each SCRUB file in `dir`, skipping earlier diff output.
fn comparison_tools(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut tools = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || SourceFormat::from_path(&path) != Some(SourceFormat::Scrub) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.ends_with(DIFF_SUFFIX) {
            continue;
        }
        tools.push((stem.to_string(), path));
    }
    tools.sort();
    Ok(tools)
}

fn load(path: &Path, root: &Path) -> Result<Vec<WarningRecord>> {
    parse_file(path, SourceFormat::Scrub, root)
        .map(|parsed| parsed.records)
        .map_err(|e| {
            PipelineError::ParseFailed {
                path: path.display().to_string(),
                source: ScrubError::from(e).into(),
            }
            .into()
        })
}
