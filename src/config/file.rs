//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[".scrub-tools.yaml", ".scrub-tools.yml", "scrub-tools.yaml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/scrub-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Config file {} does not exist; searching defaults", path.display());
    }

    let cwd = std::env::current_dir().ok();
    if let Some(path) = cwd.as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(path) = cwd
        .as_deref()
        .and_then(find_git_root)
        .and_then(|root| find_config_in_dir(&root))
    {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("scrub-tools")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up from `start`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Optional values override when set; flags override when they differ
    /// from their defaults.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.source_root.is_some() {
            self.source_root.clone_from(&other.source_root);
        }

        // Filtering
        if other.filtering.micro_filter != defaults.filtering.micro_filter {
            self.filtering.micro_filter = other.filtering.micro_filter;
        }
        if other.filtering.external_warnings {
            self.filtering.external_warnings = true;
        }
        if other.filtering.rules_file.is_some() {
            self.filtering.rules_file.clone_from(&other.filtering.rules_file);
        }
        if other.filtering.query_exclusions_file.is_some() {
            self.filtering
                .query_exclusions_file
                .clone_from(&other.filtering.query_exclusions_file);
        }
        if other.filtering.exclusion_list_file.is_some() {
            self.filtering
                .exclusion_list_file
                .clone_from(&other.filtering.exclusion_list_file);
        }

        // Output
        if other.output.sarif_version != defaults.output.sarif_version {
            self.output.sarif_version = other.output.sarif_version;
        }
        if other.output.write_sarif != defaults.output.write_sarif {
            self.output.write_sarif = other.output.write_sarif;
        }

        // Diff
        if other.diff.fail_on_new {
            self.diff.fail_on_new = true;
        }
        if other.diff.probable_matching != defaults.diff.probable_matching {
            self.diff.probable_matching = other.diff.probable_matching;
        }

        // Behavior
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.workers.is_some() {
            self.behavior.workers = other.behavior.workers;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# scrub-tools configuration
# Place this file at .scrub-tools.yaml in your project root or ~/.config/scrub-tools/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# scrub-tools configuration file
# ===============================
#
# Place it at:
#   - .scrub-tools.yaml in your project root
#   - ~/.config/scrub-tools/scrub-tools.yaml for global config
#
# CLI arguments always override file settings.

# Top-level directory of the analyzed source code
# source_root: ./src

# Filtering policy
filtering:
  # Honor scrub_ignore_warning / @suppress comments in source
  micro_filter: true
  # Keep warnings in files outside the source root
  external_warnings: false
  # Regex include/exclude rules for the analysis file list
  # rules_file: ./SCRUBFilteringRules
  # 'tool: query' exclusions
  # query_exclusions_file: ./SCRUBExcludeQueries
  # Root-relative files whose warnings are dropped
  # exclusion_list_file: ./.scrub/SCRUBExcludedFiles

# Output options
output:
  # SARIF version: 2.0.0 or 2.1.0
  sarif_version: 2.1.0
  # Also write SARIF next to the filtered SCRUB files
  write_sarif: true

# Diff options
diff:
  # Exit with code 1 when new warnings are found
  fail_on_new: false
  # Match moved warnings by their surrounding source lines
  probable_matching: true

# Behavior flags
behavior:
  # Suppress non-essential output
  quiet: false
  # Worker threads for per-file processing (default: one per core)
  # workers: 4
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
