//! SARIF 2.0.0 / 2.1.0 parser.

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::sarif::{SarifLog, SarifPhysicalLocation, SarifResult, SarifRun, SRCROOT};
use crate::model::{CodeFlowStep, IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// SARIF versions this crate reads and writes.
pub const SUPPORTED_SARIF_VERSIONS: &[&str] = &["2.1.0", "2.0.0"];

const NO_MESSAGE: &str = "No description provided";
const NO_STEP_MESSAGE: &str = "Code flow step";

/// Parser for `.sarif` files.
#[derive(Debug, Default, Clone)]
pub struct SarifParser {
    tool_name: Option<String>,
}

impl SarifParser {
    #[must_use]
    pub const fn new() -> Self {
        Self { tool_name: None }
    }

    /// Use `name` as the tool name instead of the one declared in the log.
    #[must_use]
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into().to_lowercase());
        self
    }
}

impl WarningParser for SarifParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        if content.trim().is_empty() {
            return Ok(ParsedWarnings::default());
        }
        let log: SarifLog = serde_json::from_str(content)?;
        parse_sarif_log(&log, source_root, self.tool_name.as_deref())
    }

    fn format_name(&self) -> &str {
        "SARIF"
    }
}

/// Parse SARIF text, naming the tool after the document's driver.
pub fn parse_sarif(input: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
    SarifParser::new().parse_str(input, source_root)
}

/// Convert an already deserialized SARIF log into warning records.
pub fn parse_sarif_log(
    log: &SarifLog,
    source_root: &Path,
    tool_override: Option<&str>,
) -> Result<ParsedWarnings, ParseError> {
    let version = log.version.as_str();
    if !SUPPORTED_SARIF_VERSIONS.contains(&version) {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }

    let mut parsed = ParsedWarnings::default();
    let Some(run) = log.runs.first() else {
        return Ok(parsed);
    };

    if let Some(invocation) = run.invocations.as_ref().and_then(|i| i.first()) {
        if !invocation.succeeded() {
            return Err(ParseError::ExecutionFailed(
                "invocation reports executionSuccessful = false".to_string(),
            ));
        }
    }

    let root = base_root(run, source_root).unwrap_or_else(|| paths::absolute(source_root));
    let tool = match tool_override {
        Some(name) => name.to_string(),
        None => declared_tool_name(run, version)
            .ok_or_else(|| ParseError::MissingField("runs[0].tool name".to_string()))?,
    };
    let rule_text = if version == "2.1.0" {
        full_descriptions(run)
    } else {
        HashMap::new()
    };
    let file_table = file_table(run, version);
    let ctx = RunContext {
        root: &root,
        file_table: &file_table,
    };

    let mut ids = IdSequence::new(&tool);
    for (index, result) in run.results.iter().enumerate() {
        let Some(physical) = result
            .locations
            .as_ref()
            .and_then(|l| l.first())
            .and_then(|l| l.physical_location.as_ref())
        else {
            parsed.skip(index + 1, excerpt(result), "result has no location");
            continue;
        };
        let Some(file) = ctx.file_of(physical) else {
            parsed.skip(index + 1, excerpt(result), "result location names no file");
            continue;
        };

        let mut description = vec![clean_text(result.message.text.as_deref(), NO_MESSAGE)];
        if let Some(viewer) = &result.hosted_viewer_uri {
            description.push(format!("{} viewer: {viewer}", capitalize(&tool)));
        }
        if let Some(text) = result.rule_id.as_ref().and_then(|id| rule_text.get(id)) {
            description.push(text.clone());
        }

        let record = WarningRecord::new(ids.next_id(), file, physical.start_line(), description)
            .with_tool(tool.as_str())
            .with_priority(result.rank.map_or(Priority::Low, Priority::from_rank))
            .with_query(result.rule_id.clone().unwrap_or_default())
            .with_suppressed(!result.suppressions.is_empty())
            .with_code_flow(ctx.code_flow(result));
        parsed.records.push(record);
    }

    tracing::debug!(
        "Parsed {} SARIF {} results for tool '{}' ({} skipped)",
        parsed.len(),
        version,
        tool,
        parsed.issues.len()
    );
    Ok(parsed)
}

struct RunContext<'a> {
    root: &'a Path,
    file_table: &'a [Option<String>],
}

impl RunContext<'_> {
    fn file_of(&self, physical: &SarifPhysicalLocation) -> Option<PathBuf> {
        let artifact = physical.artifact()?;
        let uri = match artifact.non_empty_uri() {
            Some(uri) => uri,
            None => {
                let index = artifact.index.or(artifact.file_index)?;
                self.file_table.get(index)?.as_deref()?
            }
        };
        Some(paths::resolve(
            Path::new(paths::strip_file_scheme(uri)),
            self.root,
        ))
    }

    fn code_flow(&self, result: &SarifResult) -> Vec<CodeFlowStep> {
        let Some(thread) = result
            .code_flows
            .first()
            .and_then(|flow| flow.thread_flows.first())
        else {
            return Vec::new();
        };
        thread
            .locations
            .iter()
            .filter_map(|step| {
                let location = step.location.as_ref()?;
                let physical = location.physical_location.as_ref()?;
                let file = self.file_of(physical)?;
                let text = location.message.as_ref().and_then(|m| m.text.as_deref());
                Some(CodeFlowStep::new(
                    file,
                    physical.start_line(),
                    clean_text(text, NO_STEP_MESSAGE),
                ))
            })
            .collect()
    }
}

/// Root declared by `originalUriBaseIds`, preferring the `SRCROOT` entry.
fn base_root(run: &SarifRun, fallback: &Path) -> Option<PathBuf> {
    let ids = run.original_uri_base_ids.as_ref()?;
    let location = ids.get(SRCROOT).or_else(|| ids.values().last())?;
    let uri = location.uri()?;
    let root = paths::resolve(Path::new(paths::strip_file_scheme(uri)), fallback);
    tracing::debug!("Using source root {} declared by SARIF log", root.display());
    Some(root)
}

fn declared_tool_name(run: &SarifRun, version: &str) -> Option<String> {
    let driver_name = run.tool.driver.as_ref().map(|d| d.name.as_str());
    let legacy_name = run.tool.name.as_deref();
    let name = if version == "2.0.0" {
        legacy_name.or(driver_name)
    } else {
        driver_name.or(legacy_name)
    }?;
    name.split_whitespace().next().map(str::to_lowercase)
}

fn full_descriptions(run: &SarifRun) -> HashMap<String, String> {
    run.tool
        .driver
        .iter()
        .flat_map(|d| d.rules.iter())
        .filter_map(|rule| {
            let text = rule.full_description.as_ref()?.text.as_deref()?;
            let text = strip_newlines(text);
            (!text.trim().is_empty()).then(|| (rule.id.clone(), text))
        })
        .collect()
}

/// Uris addressable by index: `artifacts` in 2.1.0, `files` in 2.0.0.
fn file_table(run: &SarifRun, version: &str) -> Vec<Option<String>> {
    if version == "2.1.0" {
        return run
            .artifacts
            .iter()
            .flatten()
            .map(|a| a.location.as_ref().and_then(|l| l.uri.clone()))
            .collect();
    }
    match &run.files {
        Some(serde_json::Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry {
                serde_json::Value::String(uri) => Some(uri.clone()),
                other => other
                    .pointer("/fileLocation/uri")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string),
            })
            .collect(),
        Some(serde_json::Value::Object(map)) => map.keys().cloned().map(Some).collect(),
        _ => Vec::new(),
    }
}

fn strip_newlines(text: &str) -> String {
    text.replace(['\n', '\r'], "")
}

fn clean_text(text: Option<&str>, fallback: &str) -> String {
    let text = text.map(strip_newlines).unwrap_or_default();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn excerpt(result: &SarifResult) -> String {
    let rule = result.rule_id.as_deref().unwrap_or("<no rule>");
    let text: String = result
        .message
        .text
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(60)
        .collect();
    format!("{rule}: {text}")
}
