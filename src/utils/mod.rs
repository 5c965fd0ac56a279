//! Shared utilities.

pub mod paths;
mod source;

pub use source::{SourceTree, CONTEXT_WINDOW};
