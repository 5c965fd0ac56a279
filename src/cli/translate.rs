//! Translate command handler.

use crate::config::TranslateConfig;
use crate::pipeline::perform_translation;
use anyhow::Result;

/// Run the translate command.
#[allow(clippy::needless_pass_by_value)]
pub fn run_translate(config: TranslateConfig, quiet: bool) -> Result<()> {
    let summary = perform_translation(&config)?;
    if !quiet && config.output.is_some() {
        eprintln!(
            "Translated {} {} warnings to {} ({} skipped)",
            summary.records,
            summary.tool.as_deref().unwrap_or(summary.input_format.name()),
            summary.output_format,
            summary.skipped
        );
    }
    Ok(())
}
