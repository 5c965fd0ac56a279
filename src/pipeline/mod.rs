//! Pipeline orchestration for result processing.
//!
//! Each stage wires parsers, the filter or diff engine, and the writers
//! together for one CLI command. Stages take a command config and return
//! a summary; the CLI layer decides on exit codes.

mod diff_stage;
mod filter_stage;
mod merge;
mod output;
mod translate;

pub use diff_stage::diff_directories;
pub use filter_stage::{
    filter_directory, plan_jobs, FilterJob, FilterSummary, JobFailure, JobOutcome, SARIF_RESULTS_DIR,
};
pub use merge::merge_sarif_files;
pub use output::{check_artifact, write_output, OutputTarget};
pub use translate::{perform_translation, TranslationSummary};

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to read or parse a results file
    #[error("Parse failed for {path}: {source}")]
    ParseFailed {
        path: String,
        source: anyhow::Error,
    },

    /// Filtering one job failed
    #[error("Filtering {job} failed: {source}")]
    FilterFailed {
        job: String,
        #[source]
        source: anyhow::Error,
    },

    /// Diff computation failed
    #[error("Diff failed: {source}")]
    DiffFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Output could not be written
    #[error("Writing {path} failed: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no new findings (or --fail-on-new not set)
    pub const SUCCESS: i32 = 0;
    /// New findings were detected
    pub const NEW_FINDINGS: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Build a rayon pool with `workers` threads, or `None` for the global pool.
pub(crate) fn worker_pool(workers: Option<usize>) -> anyhow::Result<Option<rayon::ThreadPool>> {
    use anyhow::Context;

    workers
        .map(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .with_context(|| format!("Failed to start {n} worker threads"))
        })
        .transpose()
}
