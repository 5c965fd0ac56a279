//! Canonical data model for static-analysis findings.
//!
//! Every supported input format is normalized into [`WarningRecord`] values
//! before filtering, diffing or serialization. The SARIF wire types in
//! [`sarif`] are shared by the SARIF parser and the SARIF writer.

pub mod sarif;
mod warning;

pub use warning::*;
