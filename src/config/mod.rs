//! Configuration module for scrub-tools.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Configuration File
//!
//! Place a `.scrub-tools.yaml` file in your project root or `~/.config/scrub-tools/`:
//!
//! ```yaml
//! source_root: ./src
//! filtering:
//!   micro_filter: true
//!   query_exclusions_file: ./SCRUBExcludeQueries
//! diff:
//!   fail_on_new: true
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, DiffConfig, DiffSettings, FileListConfig,
    FilterConfig, FilteringConfig, MergeConfig, OutputConfig, TranslateConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.scrub-tools.yaml` files.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
