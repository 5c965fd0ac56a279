//! Warning reconciliation.
//!
//! [`DiffEngine`] keeps only the comparison warnings that have no baseline
//! counterpart. A counterpart is either an exact match (same file, line and
//! description) or a probable match: same file and query, with the three
//! source lines around each warning identical in their respective trees.
//! That second rule tolerates code that merely moved.
//!
//! # Example
//!
//! ```no_run
//! use scrub_tools::diff::DiffEngine;
//! use std::path::Path;
//!
//! # let (baseline, comparison) = (Vec::new(), Vec::new());
//! let engine = DiffEngine::new(Path::new("/old/src"), Path::new("/new/src"));
//! let result = engine.diff(&baseline, &comparison);
//! println!("{} new warnings", result.new_warnings.len());
//! ```

mod engine;
mod result;

pub use engine::DiffEngine;
pub use result::{DiffResult, MatchKind, ToolDiffSummary};
