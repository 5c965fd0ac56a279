//! Configuration validation for scrub-tools.

use super::types::*;
use std::path::Path;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(root) = &self.source_root {
            if root.as_os_str().is_empty() {
                errors.push(ConfigError::new("source_root", "must not be empty"));
            }
        }
        errors.extend(self.filtering.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for FilteringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, path) in [
            ("filtering.rules_file", &self.rules_file),
            ("filtering.query_exclusions_file", &self.query_exclusions_file),
            ("filtering.exclusion_list_file", &self.exclusion_list_file),
        ] {
            if let Some(path) = path {
                if path.is_dir() {
                    errors.push(ConfigError::new(
                        field,
                        format!("{} is a directory, expected a file", path.display()),
                    ));
                }
            }
        }
        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.workers == Some(0) {
            errors.push(ConfigError::new(
                "behavior.workers",
                "must be at least 1 (omit it to use one worker per core)",
            ));
        }
        errors
    }
}

impl Validatable for FilterConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        require_dir(&mut errors, "raw_dir", &self.raw_dir);
        require_dir(&mut errors, "source_root", &self.source_root);
        errors.extend(self.filtering.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for DiffConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        require_dir(&mut errors, "baseline_dir", &self.baseline_dir);
        require_dir(&mut errors, "comparison_dir", &self.comparison_dir);
        if self.output_dir.is_file() {
            errors.push(ConfigError::new(
                "output_dir",
                format!("{} is a file, expected a directory", self.output_dir.display()),
            ));
        }
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for FileListConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.initial_list.is_none() {
            require_dir(&mut errors, "source_root", &self.source_root);
        }
        if self.output.is_dir() {
            errors.push(ConfigError::new(
                "output",
                format!("{} is a directory, expected a file", self.output.display()),
            ));
        }
        errors
    }
}

fn require_dir(errors: &mut Vec<ConfigError>, field: &str, path: &Path) {
    if !path.is_dir() {
        errors.push(ConfigError::new(
            field,
            format!("{} is not a directory", path.display()),
        ));
    }
}
