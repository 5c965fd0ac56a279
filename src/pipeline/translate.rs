//! Single-file translation: any supported input to SCRUB or SARIF.

use super::output::{check_artifact, write_output, OutputTarget};
use super::PipelineError;
use crate::config::TranslateConfig;
use crate::error::{self, ErrorContext, ScrubError};
use crate::model::WarningRecord;
use crate::parsers::{
    parse_file, ParsedWarnings, SarifParser, SonarQubeParser, SourceFormat, WarningParser,
};
use crate::reports::{format_scrub_records, serialize_sarif, OutputFormat};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a translation produced.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationSummary {
    pub input: PathBuf,
    pub input_format: SourceFormat,
    pub output_format: String,
    /// Records written (suppressed records are not written to SCRUB)
    pub records: usize,
    /// Malformed blocks or results that were skipped
    pub skipped: usize,
    pub tool: Option<String>,
}

/// Translate `config.input` and write it in the requested output format.
pub fn perform_translation(config: &TranslateConfig) -> Result<TranslationSummary> {
    let parsed = parse_input(config).map_err(|source| PipelineError::ParseFailed {
        path: config.input.display().to_string(),
        source: source.into(),
    })?;
    let ParsedWarnings { records, issues } = parsed;
    tracing::info!(
        "Translated {} warnings from {} ({} skipped)",
        records.len(),
        config.input.display(),
        issues.len()
    );

    if config.require_output && records.is_empty() {
        return Err(ScrubError::validation(format!(
            "{} produced no warnings",
            config.input.display()
        ))
        .into());
    }

    let tool = tool_name(config, &records);
    let content = match config.output_format {
        OutputFormat::Scrub => format_scrub_records(&records),
        OutputFormat::Sarif(version) => {
            serialize_sarif(&records, version, &config.source_root, &tool)
                .context("building SARIF output")?
        }
    };

    let target = OutputTarget::from_option(config.output.clone());
    write_output(&content, &target, false).map_err(|source| PipelineError::WriteFailed {
        path: config
            .output
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |p| p.display().to_string()),
        source,
    })?;
    if let Some(path) = &config.output {
        check_artifact(path, config.require_output)?;
    }

    let written = match config.output_format {
        OutputFormat::Scrub => records.iter().filter(|r| !r.suppressed).count(),
        OutputFormat::Sarif(_) => records.len(),
    };
    Ok(TranslationSummary {
        input: config.input.clone(),
        input_format: config.input_format,
        output_format: config.output_format.to_string(),
        records: written,
        skipped: issues.len(),
        tool: (!records.is_empty()).then_some(tool),
    })
}

fn parse_input(config: &TranslateConfig) -> error::Result<ParsedWarnings> {
    let parsed = match (&config.tool_name, config.input_format) {
        (Some(name), SourceFormat::Sarif) => SarifParser::new()
            .with_tool_name(name)
            .parse(&config.input, &config.source_root),
        (_, SourceFormat::SonarQubeJson) => {
            let mut parser = SonarQubeParser::new();
            if let Some(url) = &config.sonarqube_url {
                parser = parser.with_server_url(url);
            }
            parser.parse(&config.input, &config.source_root)
        }
        _ => parse_file(&config.input, config.input_format, &config.source_root),
    };
    parsed.with_context(|| format!("translating {}", config.input.display()))
}

/// Name written to the SARIF driver: the override, then the records' tool,
/// then the input file stem.
fn tool_name(config: &TranslateConfig, records: &[WarningRecord]) -> String {
    config
        .tool_name
        .clone()
        .or_else(|| records.first().map(|r| r.tool.clone()))
        .unwrap_or_else(|| file_stem(&config.input))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scrub".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::SarifVersion;
    use crate::utils::paths;

    const SCRUB_INPUT: &str = "\
gcc001 <Low> :src/foo.c:42: -Wunused-variable
    Unused variable 'x'.

gcc002 <Med> :src/bar.c:7: -Wshadow
    Declaration shadows a local.

";

    fn config(dir: &Path, output_format: OutputFormat) -> TranslateConfig {
        let input = dir.join("gcc.scrub");
        std::fs::write(&input, SCRUB_INPUT).unwrap();
        TranslateConfig {
            input,
            input_format: SourceFormat::Scrub,
            output: Some(dir.join("out").join("gcc.out")),
            output_format,
            source_root: dir.to_path_buf(),
            tool_name: None,
            sonarqube_url: None,
            require_output: false,
        }
    }

    #[test]
    fn test_scrub_to_sarif() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), OutputFormat::Sarif(SarifVersion::V2_1_0));
        let summary = perform_translation(&config).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.tool.as_deref(), Some("gcc"));

        let text = std::fs::read_to_string(config.output.unwrap()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["runs"][0]["tool"]["driver"]["name"], "gcc");
        assert_eq!(doc["runs"][0]["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_scrub_to_scrub_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), OutputFormat::Scrub);
        perform_translation(&config).unwrap();
        let output = config.output.clone().unwrap();
        let first = std::fs::read_to_string(&output).unwrap();
        let anchored = paths::to_slash(&dir.path().join("src/foo.c"));
        assert!(first.contains(&format!(":{anchored}:42: -Wunused-variable")), "{first}");

        config.input = dir.path().join("first.scrub");
        std::fs::write(&config.input, &first).unwrap();
        perform_translation(&config).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), first);
    }

    #[test]
    fn test_require_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), OutputFormat::Scrub);
        std::fs::write(&config.input, "").unwrap();
        assert!(perform_translation(&config).is_ok());

        config.require_output = true;
        let err = perform_translation(&config).unwrap_err();
        assert!(err.to_string().contains("produced no warnings"), "{err}");
    }

    #[test]
    fn test_missing_input_is_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), OutputFormat::Scrub);
        config.input = dir.path().join("missing.scrub");
        let err = perform_translation(&config).unwrap_err();
        assert!(err.downcast_ref::<PipelineError>().is_some());
    }
}
