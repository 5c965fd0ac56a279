//! Coverity JSON (`cov-format-errors --json-output-v7`) parser.

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{CodeFlowStep, IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CoverityReport {
    issues: Option<Vec<CoverityIssue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoverityIssue {
    main_event_file_pathname: String,
    main_event_line_number: u32,
    checker_name: String,
    #[serde(default)]
    checker_properties: Option<CheckerProperties>,
    #[serde(default)]
    events: Vec<CoverityEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckerProperties {
    #[serde(default)]
    subcategory_long_description: String,
    #[serde(default)]
    impact: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoverityEvent {
    event_tag: String,
    #[serde(default)]
    event_description: String,
    #[serde(default)]
    stripped_file_pathname: String,
    #[serde(default)]
    line_number: u32,
}

/// Parser for the Coverity JSON issue export.
///
/// The main event gives the location, the checker name becomes the query and
/// every event other than `caretline` becomes a code-flow step.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoverityJsonParser;

impl WarningParser for CoverityJsonParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        if content.trim().is_empty() {
            return Ok(parsed);
        }
        let report: CoverityReport = serde_json::from_str(content)?;
        let issues = report
            .issues
            .ok_or_else(|| ParseError::MissingField("issues".to_string()))?;

        let mut ids = IdSequence::new("coverity");
        for issue in issues {
            let properties = issue.checker_properties.unwrap_or_default();
            let description = if properties.subcategory_long_description.trim().is_empty() {
                issue.checker_name.clone()
            } else {
                properties.subcategory_long_description
            };
            let steps = issue
                .events
                .iter()
                .filter(|event| event.event_tag != "caretline")
                .map(|event| {
                    CodeFlowStep::new(
                        paths::resolve(Path::new(&event.stripped_file_pathname), source_root),
                        event.line_number,
                        format!("{}: {}", event.event_tag, event.event_description),
                    )
                })
                .collect();

            parsed.records.push(
                WarningRecord::new(
                    ids.next_id(),
                    paths::resolve(Path::new(&issue.main_event_file_pathname), source_root),
                    issue.main_event_line_number,
                    description
                        .lines()
                        .filter(|line| !line.trim().is_empty())
                        .map(str::to_string)
                        .collect(),
                )
                .with_priority(impact_priority(&properties.impact))
                .with_query(issue.checker_name)
                .with_code_flow(steps),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "Coverity JSON"
    }
}

/// `High` and `Medium` impacts carry over; `Low`, `Audit` and anything else
/// are low priority.
fn impact_priority(impact: &str) -> Priority {
    match impact.to_ascii_lowercase().as_str() {
        "high" => Priority::High,
        "medium" => Priority::Med,
        _ => Priority::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REPORT: &str = r#"{
      "type": "Coverity issues",
      "formatVersion": 7,
      "issues": [
        {
          "mainEventFilePathname": "/w/src/bar.c",
          "mainEventLineNumber": 10,
          "checkerName": "NULL_RETURNS",
          "checkerProperties": {
            "subcategoryLongDescription": "Dereference null return value",
            "impact": "Medium"
          },
          "events": [
            {"eventTag": "returned_null", "eventDescription": "Returning null.",
             "strippedFilePathname": "src/bar.c", "lineNumber": 5},
            {"eventTag": "caretline", "eventDescription": "",
             "strippedFilePathname": "src/bar.c", "lineNumber": 10},
            {"eventTag": "dereference", "eventDescription": "Dereferencing p.",
             "strippedFilePathname": "src/bar.c", "lineNumber": 10}
          ]
        },
        {
          "mainEventFilePathname": "src/foo.c",
          "mainEventLineNumber": 3,
          "checkerName": "UNUSED_VALUE",
          "checkerProperties": null
        }
      ]
    }"#;

    #[test]
    fn test_parse_coverity_issues() {
        let parsed = CoverityJsonParser.parse_str(REPORT, Path::new("/w")).unwrap();
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first.id, "coverity001");
        assert_eq!(first.file, PathBuf::from("/w/src/bar.c"));
        assert_eq!(first.line, 10);
        assert_eq!(first.priority, Priority::Med);
        assert_eq!(first.query.as_deref(), Some("NULL_RETURNS"));
        assert_eq!(first.description, vec!["Dereference null return value"]);
        assert_eq!(first.code_flow.len(), 2);
        assert_eq!(first.code_flow[0].file, PathBuf::from("/w/src/bar.c"));
        assert_eq!(first.code_flow[0].line, 5);
        assert_eq!(first.code_flow[0].description, "returned_null: Returning null.");

        let second = &parsed.records[1];
        assert_eq!(second.file, PathBuf::from("/w/src/foo.c"));
        assert_eq!(second.priority, Priority::Low);
        assert_eq!(second.description, vec!["UNUSED_VALUE"]);
        assert!(second.code_flow.is_empty());
    }

    #[test]
    fn test_missing_issues_is_file_error() {
        let err = CoverityJsonParser
            .parse_str(r#"{"type": "Coverity issues"}"#, Path::new("/w"))
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingField(ref f) if f == "issues"));
    }

    #[test]
    fn test_impact_priority() {
        assert_eq!(impact_priority("HIGH"), Priority::High);
        assert_eq!(impact_priority("Audit"), Priority::Low);
        assert_eq!(impact_priority(""), Priority::Low);
    }
}
