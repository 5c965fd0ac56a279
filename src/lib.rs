//! **Normalization, filtering and reconciliation of static-analysis warnings.**
//!
//! `scrub-tools` reads the output of static analyzers and compilers, converts every
//! finding into one canonical record type, and then:
//!
//! - writes the records as **SCRUB** text (a line-oriented format meant for
//!   reviewers) or as **SARIF** 2.0.0 / 2.1.0,
//! - filters them against excluded files, inline suppression comments and
//!   excluded `(tool, query)` pairs,
//! - reconciles a comparison result set against a baseline so only warnings a
//!   change actually introduced remain.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: [`WarningRecord`], the canonical finding, plus the SARIF wire types.
//! - **[`parsers`]**: translators from SCRUB, SARIF, gcc, javac and gbuild logs, and Coverity,
//!   Klocwork, SonarQube and pylint JSON,
//!   selected explicitly through [`SourceFormat`].
//! - **[`reports`]**: SCRUB and SARIF writers and SARIF merging.
//! - **[`filter`]**: the [`FilterEngine`] and the file-list builder.
//! - **[`diff`]**: the [`DiffEngine`], which matches warnings exactly or by their
//!   surrounding source lines.
//! - **[`pipeline`]**: directory-level stages used by the CLI.
//!
//! ## Getting Started
//!
//! ```no_run
//! use scrub_tools::{parse_file, FilterEngine, FilterPolicy, SourceFormat};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Path::new("/work/src");
//!     let parsed = parse_file(Path::new("raw/coverity.sarif"), SourceFormat::Sarif, root)?;
//!
//!     let engine = FilterEngine::new(root, FilterPolicy::new().with_micro_filter(true));
//!     let outcome = engine.filter(parsed.records);
//!     print!("{}", scrub_tools::reports::format_scrub_records(&outcome.records));
//!     Ok(())
//! }
//! ```
//!
//! ### Finding New Warnings
//!
//! ```no_run
//! use scrub_tools::{parse_file, DiffEngine, SourceFormat};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (old_root, new_root) = (Path::new("/base/src"), Path::new("/work/src"));
//!     let baseline = parse_file(Path::new("base/gcc.scrub"), SourceFormat::Scrub, old_root)?;
//!     let current = parse_file(Path::new("work/gcc.scrub"), SourceFormat::Scrub, new_root)?;
//!
//!     let result = DiffEngine::new(old_root, new_root).diff(&baseline.records, &current.records);
//!     for warning in &result.new_warnings {
//!         println!("{}:{} {}", warning.file.display(), warning.line, warning.query_str());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the library crate. The `scrub-tools` binary exposes the
//! same stages as `translate`, `filter`, `file-list`, `diff` and `merge-sarif`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use config::{
    BehaviorConfig, DiffConfig, DiffSettings, FileListConfig, FilterConfig, FilteringConfig,
    MergeConfig, OutputConfig, TranslateConfig,
};
pub use diff::{DiffEngine, DiffResult, MatchKind, ToolDiffSummary};
pub use error::{ErrorContext, Result, ScrubError};
pub use filter::{FilterEngine, FilterOutcome, FilterPolicy, FilterStats, QueryExclusions};
pub use model::{CodeFlowStep, IdSequence, Priority, WarningRecord};
pub use parsers::{parse_file, parse_str, ParsedWarnings, SourceFormat, WarningParser};
pub use reports::{OutputFormat, SarifVersion};
