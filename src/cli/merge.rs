//! Merge-sarif command handler.

use crate::config::MergeConfig;
use crate::pipeline::merge_sarif_files;
use anyhow::Result;

/// Run the merge-sarif command.
#[allow(clippy::needless_pass_by_value)]
pub fn run_merge(config: MergeConfig, quiet: bool) -> Result<()> {
    merge_sarif_files(&config)?;
    if !quiet {
        if let Some(path) = &config.output {
            eprintln!(
                "Merged {} and {} into {} (SARIF {})",
                config.first.display(),
                config.second.display(),
                path.display(),
                config.version
            );
        }
    }
    Ok(())
}
