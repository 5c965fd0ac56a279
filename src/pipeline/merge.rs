//! Merging two SARIF files.

use super::output::{write_output, OutputTarget};
use super::PipelineError;
use crate::config::MergeConfig;
use crate::error::ScrubError;
use crate::reports::merge_sarif_str;
use anyhow::{Context, Result};

/// Merge the first run of each input into one document and write it.
pub fn merge_sarif_files(config: &MergeConfig) -> Result<()> {
    let first = std::fs::read_to_string(&config.first)
        .with_context(|| format!("Failed to read {}", config.first.display()))?;
    let second = std::fs::read_to_string(&config.second)
        .with_context(|| format!("Failed to read {}", config.second.display()))?;

    let merged = merge_sarif_str(&first, &second, config.version)
        .map_err(ScrubError::from)
        .with_context(|| {
            format!(
                "Failed to merge {} and {}",
                config.first.display(),
                config.second.display()
            )
        })?;

    let target = OutputTarget::from_option(config.output.clone());
    write_output(&merged, &target, false).map_err(|source| PipelineError::WriteFailed {
        path: config
            .output
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |p| p.display().to_string()),
        source,
    })?;
    Ok(())
}
