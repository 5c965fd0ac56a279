//! Output serialization.
//!
//! - SCRUB: the line-oriented text format, one block per unsuppressed record
//! - SARIF: 2.0.0 or 2.1.0 documents, plus merging of two documents
//!
//! Writers take records and return text; where the text ends up is the
//! pipeline's concern.

mod sarif;
mod scrub;

pub use sarif::{build_sarif_log, merge_sarif, merge_sarif_str, serialize_sarif};
pub use scrub::{format_scrub_records, format_scrub_text};

use crate::model::sarif::{SARIF_SCHEMA_2_0_0, SARIF_SCHEMA_2_1_0};
use clap::builder::PossibleValue;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while producing output
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("SARIF error: {0}")]
    SarifError(String),
}

/// SARIF schema version to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SarifVersion {
    #[serde(rename = "2.0.0")]
    V2_0_0,
    #[default]
    #[serde(rename = "2.1.0")]
    V2_1_0,
}

impl SarifVersion {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V2_0_0 => "2.0.0",
            Self::V2_1_0 => "2.1.0",
        }
    }

    /// `$schema` uri declared by documents of this version.
    #[must_use]
    pub const fn schema(&self) -> &'static str {
        match self {
            Self::V2_0_0 => SARIF_SCHEMA_2_0_0,
            Self::V2_1_0 => SARIF_SCHEMA_2_1_0,
        }
    }
}

impl fmt::Display for SarifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SarifVersion {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches(['v', 'V']) {
            "2.0.0" => Ok(Self::V2_0_0),
            "2.1.0" => Ok(Self::V2_1_0),
            other => Err(ReportError::SarifError(format!(
                "unsupported SARIF version '{other}' (expected 2.0.0 or 2.1.0)"
            ))),
        }
    }
}

/// Output format for translated or filtered warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// SCRUB text
    #[default]
    Scrub,
    /// SARIF of the given version
    Sarif(SarifVersion),
}

impl OutputFormat {
    /// SARIF version, when this is a SARIF format.
    #[must_use]
    pub const fn sarif_version(&self) -> Option<SarifVersion> {
        match self {
            Self::Scrub => None,
            Self::Sarif(version) => Some(*version),
        }
    }

    /// File extension written for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Scrub => "scrub",
            Self::Sarif(_) => "sarif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scrub => write!(f, "scrub"),
            Self::Sarif(version) => write!(f, "sarifv{version}"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = crate::parsers::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scrub" => Ok(Self::Scrub),
            "sarif" | "sarifv2.1.0" => Ok(Self::Sarif(SarifVersion::V2_1_0)),
            "sarifv2.0.0" => Ok(Self::Sarif(SarifVersion::V2_0_0)),
            _ => Err(crate::parsers::ParseError::UnknownFormat(s.to_string())),
        }
    }
}

impl ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Scrub,
            Self::Sarif(SarifVersion::V2_1_0),
            Self::Sarif(SarifVersion::V2_0_0),
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Scrub => PossibleValue::new("scrub").help("SCRUB text"),
            Self::Sarif(SarifVersion::V2_1_0) => PossibleValue::new("sarifv2.1.0")
                .alias("sarif")
                .help("SARIF 2.1.0"),
            Self::Sarif(SarifVersion::V2_0_0) => {
                PossibleValue::new("sarifv2.0.0").help("SARIF 2.0.0")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("scrub".parse::<OutputFormat>().unwrap(), OutputFormat::Scrub);
        assert_eq!(
            "sarif".parse::<OutputFormat>().unwrap(),
            OutputFormat::Sarif(SarifVersion::V2_1_0)
        );
        assert_eq!(
            "SARIFv2.0.0".parse::<OutputFormat>().unwrap(),
            OutputFormat::Sarif(SarifVersion::V2_0_0)
        );
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_value_enum() {
        let parsed = <OutputFormat as ValueEnum>::from_str("sarif", true).unwrap();
        assert_eq!(parsed.sarif_version(), Some(SarifVersion::V2_1_0));
        let parsed = <OutputFormat as ValueEnum>::from_str("sarifv2.0.0", true).unwrap();
        assert_eq!(parsed.sarif_version(), Some(SarifVersion::V2_0_0));
        assert_eq!(OutputFormat::Scrub.sarif_version(), None);
    }

    #[test]
    fn test_display_round_trips() {
        for format in OutputFormat::value_variants() {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), *format);
        }
    }

    #[test]
    fn test_sarif_version_serde() {
        let v: SarifVersion = serde_json::from_str("\"2.0.0\"").unwrap();
        assert_eq!(v, SarifVersion::V2_0_0);
        assert_eq!(serde_json::to_string(&SarifVersion::V2_1_0).unwrap(), "\"2.1.0\"");
        assert!("3.0".parse::<SarifVersion>().is_err());
    }
}
