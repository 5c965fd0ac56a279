//! Unified error types for scrub-tools.
//!
//! Errors fall into four families: block-level parse problems that are
//! reported and skipped, file-level format problems that abort one file,
//! I/O problems that the filtering and diff stages tolerate, and validation
//! failures for required artifacts.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scrub-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    /// A result file could not be translated
    #[error("Failed to parse results: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Unknown or unsupported format for a whole file
    #[error("Unsupported format: {context}")]
    Format {
        context: String,
        #[source]
        source: FormatErrorKind,
    },

    /// Errors during output generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required artifact is missing or empty
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Malformed warning block at line {line}: {reason}")]
    MalformedBlock { line: usize, reason: String },

    #[error("Analysis did not complete successfully: {0}")]
    ExecutionFailed(String),
}

/// Specific format error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormatErrorKind {
    #[error("Unknown format '{0}'")]
    UnknownFormat(String),

    #[error("Unsupported SARIF version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("SARIF generation failed: {0}")]
    SarifError(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for scrub-tools operations
pub type Result<T> = std::result::Result<T, ScrubError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ScrubError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a format error with context
    pub fn format(context: impl Into<String>, source: FormatErrorKind) -> Self {
        Self::Format {
            context: context.into(),
            source,
        }
    }

    /// Create a format error for an unrecognized format name
    pub fn unknown_format(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::format(
            format!("while selecting '{name}'"),
            FormatErrorKind::UnknownFormat(name),
        )
    }

    /// Create a parse error for missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ScrubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ScrubError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<crate::parsers::ParseError> for ScrubError {
    fn from(err: crate::parsers::ParseError) -> Self {
        use crate::parsers::ParseError as P;
        match err {
            P::UnsupportedVersion(version) => Self::format(
                "reading SARIF",
                FormatErrorKind::UnsupportedVersion {
                    version,
                    supported: crate::parsers::SUPPORTED_SARIF_VERSIONS.join(", "),
                },
            ),
            P::UnknownFormat(name) => Self::unknown_format(name),
            P::IoError(msg) => Self::Io {
                path: None,
                message: msg.clone(),
                source: std::io::Error::other(msg),
            },
            P::JsonError(msg) => Self::parse("SARIF document", ParseErrorKind::InvalidJson(msg)),
            P::MissingField(field) => Self::missing_field(field, "SARIF document"),
            P::ExecutionFailed(msg) => {
                Self::parse("SARIF invocation", ParseErrorKind::ExecutionFailed(msg))
            }
        }
    }
}

impl From<crate::reports::ReportError> for ScrubError {
    fn from(err: crate::reports::ReportError) -> Self {
        use crate::reports::ReportError as R;
        match err {
            R::IoError(e) => Self::from(e),
            R::SerializationError(msg) => {
                Self::report("serializing", ReportErrorKind::JsonSerializationError(msg))
            }
            R::SarifError(msg) => Self::report("building SARIF", ReportErrorKind::SarifError(msg)),
        }
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Each call prepends its context to whatever context the error already
/// carries, so the final message reads from the outermost caller inwards.
///
/// ```ignore
/// use scrub_tools::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<Vec<WarningRecord>> {
///     let text = std::fs::read_to_string(path).context("reading SCRUB file")?;
///     parse_scrub_records(&text, root)
///         .with_context(|| format!("parsing {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ScrubError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: ScrubError, new_ctx: &str) -> ScrubError {
    match err {
        ScrubError::Parse {
            context: existing,
            source,
        } => ScrubError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScrubError::Format {
            context: existing,
            source,
        } => ScrubError::Format {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScrubError::Report {
            context: existing,
            source,
        } => ScrubError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ScrubError::Io {
            path,
            message,
            source,
        } => ScrubError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ScrubError::Config(msg) => ScrubError::Config(chain_context(new_ctx, &msg)),
        ScrubError::Validation(msg) => ScrubError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Returns "`new`: `existing`", or just `new` when nothing exists yet.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
