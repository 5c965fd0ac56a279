//! File-list command handler.

use super::ensure_valid;
use crate::config::FileListConfig;
use crate::filter::file_list::read_file_list;
use crate::filter::{build_file_list, FileListRules};
use crate::pipeline::check_artifact;
use anyhow::{Context, Result};

/// Run the file-list command.
#[allow(clippy::needless_pass_by_value)]
pub fn run_file_list(config: FileListConfig, quiet: bool) -> Result<()> {
    ensure_valid(&config)?;

    let rules = match &config.rules_file {
        Some(path) => FileListRules::load(path)
            .with_context(|| format!("Failed to read filtering rules {}", path.display()))?,
        None => FileListRules::default(),
    };
    let initial = config
        .initial_list
        .as_deref()
        .map(|path| {
            read_file_list(path)
                .with_context(|| format!("Failed to read file list {}", path.display()))
        })
        .transpose()?;

    let selection = build_file_list(&config.source_root, &rules, initial);
    selection
        .write(&config.output, config.exclusion_output.as_deref())
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    check_artifact(&config.output, false)?;

    if !quiet {
        eprintln!(
            "{} files in scope, {} excluded; list written to {}",
            selection.included.len(),
            selection.excluded.len(),
            config.output.display()
        );
    }
    Ok(())
}
