//! Klocwork JSON-lines parser (`kwciagent list -F json`).

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct KlocworkIssue {
    file: String,
    #[serde(default)]
    line: u32,
    code: String,
    message: String,
    #[serde(default)]
    url: String,
}

/// Parser for Klocwork issue lists, one JSON object per line.
///
/// A line that is not a valid issue object is skipped and reported; the rest
/// of the file still parses.
#[derive(Debug, Default, Clone, Copy)]
pub struct KlocworkParser;

impl WarningParser for KlocworkParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        let mut ids = IdSequence::new("klocwork");
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let issue: KlocworkIssue = match serde_json::from_str(line) {
                Ok(issue) => issue,
                Err(e) => {
                    parsed.skip(index + 1, truncate(line), e.to_string());
                    continue;
                }
            };

            let mut description: Vec<String> = issue
                .message
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect();
            // The portal link carries the search query after the issue id.
            let link = issue.url.split(",searchquery").next().unwrap_or_default();
            if !link.is_empty() {
                description.push(link.to_string());
            }
            parsed.records.push(
                WarningRecord::new(
                    ids.next_id(),
                    paths::resolve(Path::new(&issue.file), source_root),
                    issue.line,
                    description,
                )
                .with_priority(Priority::Low)
                .with_query(issue.code),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "Klocwork JSON lines"
    }
}

fn truncate(line: &str) -> String {
    line.chars().take(80).collect()
}
