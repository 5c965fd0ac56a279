//! Result-file parsers.
//!
//! Every parser converts one analyzer output into [`WarningRecord`]s with
//! absolute file paths. The caller always names the input format through
//! [`SourceFormat`]; nothing is sniffed from content.
//!
//! ## Usage
//!
//! ```no_run
//! use scrub_tools::parsers::{parse_file, SourceFormat};
//! use std::path::Path;
//!
//! let parsed = parse_file(
//!     Path::new("raw/coverity.sarif"),
//!     SourceFormat::Sarif,
//!     Path::new("/work/src"),
//! )
//! .unwrap();
//! println!("{} warnings, {} skipped", parsed.len(), parsed.issues.len());
//! ```
//!
//! [`WarningRecord`]: crate::model::WarningRecord

mod compiler;
mod coverity;
mod klocwork;
mod pylint;
mod sarif;
mod scrub;
mod sonarqube;
mod traits;

pub use compiler::{GbuildLogParser, GccLogParser, JavacLogParser};
pub use coverity::CoverityJsonParser;
pub use klocwork::KlocworkParser;
pub use pylint::PylintParser;
pub use sarif::{parse_sarif, parse_sarif_log, SarifParser, SUPPORTED_SARIF_VERSIONS};
pub use scrub::{parse_scrub_text, ScrubParser, CODE_FLOW_MARKER, INDENT};
pub use sonarqube::SonarQubeParser;
pub use traits::{ParseError, ParseIssue, ParsedWarnings, WarningParser};

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input formats understood by the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// SCRUB text
    Scrub,
    /// SARIF 2.0.0 or 2.1.0
    Sarif,
    /// gcc build log
    #[value(name = "gcc", alias = "gcc-log")]
    GccLog,
    /// javac build log
    #[value(name = "javac", alias = "javac-log")]
    JavacLog,
    /// pylint JSON report
    #[value(name = "pylint", alias = "pylint-json")]
    PylintJson,
    /// Green Hills gbuild log with DoubleCheck findings
    #[value(name = "gbuild", alias = "doublecheck")]
    GbuildLog,
    /// Coverity JSON issue export
    #[value(name = "coverity", alias = "coverity-json")]
    CoverityJson,
    /// Klocwork issue list, one JSON object per line
    #[value(name = "klocwork", alias = "klocwork-json")]
    KlocworkJson,
    /// SonarQube issues or hotspots export
    #[value(name = "sonarqube", alias = "sonarqube-json")]
    SonarQubeJson,
}

impl SourceFormat {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scrub => "scrub",
            Self::Sarif => "sarif",
            Self::GccLog => "gcc",
            Self::JavacLog => "javac",
            Self::PylintJson => "pylint",
            Self::GbuildLog => "gbuild",
            Self::CoverityJson => "coverity",
            Self::KlocworkJson => "klocwork",
            Self::SonarQubeJson => "sonarqube",
        }
    }

    /// Format implied by a `.scrub` or `.sarif` extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "scrub" => Some(Self::Scrub),
            "sarif" => Some(Self::Sarif),
            _ => None,
        }
    }

    /// Parser instance for this format.
    #[must_use]
    pub fn parser(&self) -> Box<dyn WarningParser> {
        match self {
            Self::Scrub => Box::new(ScrubParser::new()),
            Self::Sarif => Box::new(SarifParser::new()),
            Self::GccLog => Box::new(GccLogParser),
            Self::JavacLog => Box::new(JavacLogParser),
            Self::PylintJson => Box::new(PylintParser),
            Self::GbuildLog => Box::new(GbuildLogParser),
            Self::CoverityJson => Box::new(CoverityJsonParser),
            Self::KlocworkJson => Box::new(KlocworkParser),
            Self::SonarQubeJson => Box::new(SonarQubeParser::new()),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| ParseError::UnknownFormat(s.to_string()))
    }
}

/// Parse a results file in the given format.
pub fn parse_file(
    path: &Path,
    format: SourceFormat,
    source_root: &Path,
) -> Result<ParsedWarnings, ParseError> {
    tracing::debug!("Parsing {} as {}", path.display(), format);
    format.parser().parse(path, source_root)
}

/// Parse results content in the given format.
pub fn parse_str(
    content: &str,
    format: SourceFormat,
    source_root: &Path,
) -> Result<ParsedWarnings, ParseError> {
    format.parser().parse_str(content, source_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a/gcc.scrub")), Some(SourceFormat::Scrub));
        assert_eq!(SourceFormat::from_path(Path::new("a/x.SARIF")), Some(SourceFormat::Sarif));
        assert_eq!(SourceFormat::from_path(Path::new("build.log")), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("gcc".parse::<SourceFormat>().unwrap(), SourceFormat::GccLog);
        assert_eq!("pylint-json".parse::<SourceFormat>().unwrap(), SourceFormat::PylintJson);
        assert_eq!("doublecheck".parse::<SourceFormat>().unwrap(), SourceFormat::GbuildLog);
        assert_eq!("Klocwork".parse::<SourceFormat>().unwrap(), SourceFormat::KlocworkJson);
        assert_eq!(SourceFormat::SonarQubeJson.to_string(), "sonarqube");
        assert!(matches!(
            "xml".parse::<SourceFormat>(),
            Err(ParseError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_dispatch() {
        let parsed = parse_str(
            "gcc001 <Low> :a.c:1: q\n    d\n",
            SourceFormat::Scrub,
            Path::new("/r"),
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
