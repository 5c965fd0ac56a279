//! Filter command handler.

use super::ensure_valid;
use crate::config::FilterConfig;
use crate::pipeline::filter_directory;
use anyhow::Result;

/// Run the filter command.
///
/// Groups that fail are reported but do not fail the command, matching how
/// the rest of the results are still produced.
#[allow(clippy::needless_pass_by_value)]
pub fn run_filter(config: FilterConfig) -> Result<()> {
    ensure_valid(&config)?;
    let summary = filter_directory(&config)?;

    if !config.behavior.quiet {
        for job in &summary.jobs {
            eprintln!(
                "{:<16} kept {:>5} of {:>5}  (excluded file {}, external {}, suppressed {}, excluded query {})",
                job.name,
                job.stats.kept,
                job.stats.input,
                job.stats.excluded_file,
                job.stats.external,
                job.stats.suppressed,
                job.stats.excluded_query
            );
        }
        for failure in &summary.failed {
            eprintln!("{:<16} FAILED: {}", failure.name, failure.error);
        }
        eprintln!(
            "{} warnings kept across {} outputs in {}",
            summary.kept(),
            summary.jobs.len(),
            config.output_dir.display()
        );
    }
    Ok(())
}
