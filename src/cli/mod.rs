//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler validates its config, runs one pipeline stage and reports
//! the outcome.

mod diff;
mod file_list;
mod filter;
mod merge;
mod translate;

pub use diff::run_diff;
pub use file_list::run_file_list;
pub use filter::run_filter;
pub use merge::run_merge;
pub use translate::run_translate;

use crate::config::Validatable;
use anyhow::Result;

/// Fail with every validation error when `config` is invalid.
fn ensure_valid(config: &impl Validatable) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::bail!("Invalid arguments:\n  {}", details.join("\n  "))
}
