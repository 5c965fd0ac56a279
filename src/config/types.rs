//! Configuration types for scrub-tools operations.
//!
//! [`AppConfig`] is what a config file holds. The per-command structs below
//! it are assembled from CLI arguments with the file values as defaults.

use crate::parsers::SourceFormat;
use crate::reports::{OutputFormat, SarifVersion};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Settings that can be loaded from a config file.
///
/// CLI flags override anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Top-level directory of the analyzed source code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
    /// Filtering policy
    pub filtering: FilteringConfig,
    /// Output options
    pub output: OutputConfig,
    /// Diff options
    pub diff: DiffSettings,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.source_root = Some(root.into());
        self
    }

    pub const fn micro_filter(mut self, enabled: bool) -> Self {
        self.config.filtering.micro_filter = enabled;
        self
    }

    pub const fn external_warnings(mut self, keep: bool) -> Self {
        self.config.filtering.external_warnings = keep;
        self
    }

    pub const fn sarif_version(mut self, version: SarifVersion) -> Self {
        self.config.output.sarif_version = version;
        self
    }

    pub const fn write_sarif(mut self, enabled: bool) -> Self {
        self.config.output.write_sarif = enabled;
        self
    }

    pub const fn fail_on_new(mut self, fail: bool) -> Self {
        self.config.diff.fail_on_new = fail;
        self
    }

    pub const fn workers(mut self, workers: usize) -> Self {
        self.config.behavior.workers = Some(workers);
        self
    }

    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Filtering policy settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilteringConfig {
    /// Honor `scrub_ignore_warning` / `@suppress` comments in source
    pub micro_filter: bool,
    /// Keep warnings in files outside the source root
    pub external_warnings: bool,
    /// Regex include/exclude rules used to build the file list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,
    /// `tool: query` exclusion list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_exclusions_file: Option<PathBuf>,
    /// Root-relative files whose warnings are always dropped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion_list_file: Option<PathBuf>,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            micro_filter: true,
            external_warnings: false,
            rules_file: None,
            query_exclusions_file: None,
            exclusion_list_file: None,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// SARIF version written by `filter` and `merge-sarif`
    pub sarif_version: SarifVersion,
    /// Also write SARIF next to the filtered SCRUB files
    pub write_sarif: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sarif_version: SarifVersion::V2_1_0,
            write_sarif: true,
        }
    }
}

/// Diff settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiffSettings {
    /// Exit with code 1 when new warnings are found
    pub fail_on_new: bool,
    /// Match moved warnings by their surrounding source lines
    pub probable_matching: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            fail_on_new: false,
            probable_matching: true,
        }
    }
}

/// Behavior flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress non-essential output
    pub quiet: bool,
    /// Worker threads for per-file processing (default: one per core)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

// ============================================================================
// Command Configuration Types
// ============================================================================

/// Configuration for a single-file translation
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub input: PathBuf,
    pub input_format: SourceFormat,
    /// `None` writes to stdout
    pub output: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub source_root: PathBuf,
    /// Overrides the tool name declared by (or derived from) the input
    pub tool_name: Option<String>,
    /// SonarQube server for finding links in SonarQube descriptions
    pub sonarqube_url: Option<String>,
    /// Fail when the translation produces no warnings
    pub require_output: bool,
}

/// Configuration for filtering a directory of raw results
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub raw_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_root: PathBuf,
    pub filtering: FilteringConfig,
    pub output: OutputConfig,
    pub behavior: BehaviorConfig,
}

/// Configuration for building the analysis file list
#[derive(Debug, Clone)]
pub struct FileListConfig {
    pub source_root: PathBuf,
    pub rules_file: Option<PathBuf>,
    /// Start from this list instead of walking the source root
    pub initial_list: Option<PathBuf>,
    pub output: PathBuf,
    /// Where to write the complement, if anywhere
    pub exclusion_output: Option<PathBuf>,
}

/// Configuration for diffing two result directories
#[derive(Debug, Clone)]
pub struct DiffConfig {
    pub baseline_dir: PathBuf,
    pub comparison_dir: PathBuf,
    pub baseline_root: PathBuf,
    pub comparison_root: PathBuf,
    pub output_dir: PathBuf,
    pub settings: DiffSettings,
    pub behavior: BehaviorConfig,
}

/// Configuration for merging two SARIF documents
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub first: PathBuf,
    pub second: PathBuf,
    pub output: Option<PathBuf>,
    pub version: SarifVersion,
}
