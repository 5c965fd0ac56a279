//! Pylint JSON output parser.

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PylintMessage {
    path: String,
    line: u32,
    message: String,
    #[serde(rename = "message-id")]
    message_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    symbol: String,
}

/// Parser for `pylint --output-format=json` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct PylintParser;

impl WarningParser for PylintParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        if content.trim().is_empty() {
            return Ok(parsed);
        }
        let messages: Vec<PylintMessage> = serde_json::from_str(content)?;
        let mut ids = IdSequence::new("pylint");
        for msg in messages {
            let mut description = vec![format!("[Type: {}] [{}]", msg.message_id, msg.kind)];
            description.extend(
                msg.message
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string),
            );
            parsed.records.push(
                WarningRecord::new(
                    ids.next_id(),
                    paths::resolve(Path::new(&msg.path), source_root),
                    msg.line,
                    description,
                )
                .with_priority(Priority::Low)
                .with_query(msg.symbol),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "pylint JSON"
    }
}
