//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing two filtered result
//! directories.

use super::ensure_valid;
use crate::config::DiffConfig;
use crate::diff::ToolDiffSummary;
use crate::pipeline::{diff_directories, exit_codes};
use anyhow::Result;

/// Run the diff command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
#[allow(clippy::needless_pass_by_value)]
pub fn run_diff(config: DiffConfig) -> Result<i32> {
    ensure_valid(&config)?;
    let summaries = diff_directories(&config)?;

    if !config.behavior.quiet {
        print_summary(&summaries);
    }
    Ok(determine_exit_code(&config, &summaries))
}

fn print_summary(summaries: &[ToolDiffSummary]) {
    eprintln!("{:<16} {:>6} {:>6} {:>9}", "tool", "new", "exact", "probable");
    for s in summaries {
        let marker = if s.had_baseline { "" } else { "  (no baseline)" };
        eprintln!(
            "{:<16} {:>6} {:>6} {:>9}{marker}",
            s.tool, s.new_warnings, s.exact_matches, s.probable_matches
        );
    }
}

/// Determine the exit code based on diff results and config flags.
fn determine_exit_code(config: &DiffConfig, summaries: &[ToolDiffSummary]) -> i32 {
    if config.settings.fail_on_new && summaries.iter().any(|s| s.new_warnings > 0) {
        return exit_codes::NEW_FINDINGS;
    }
    exit_codes::SUCCESS
}
