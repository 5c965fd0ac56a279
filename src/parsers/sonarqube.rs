//! SonarQube web API export parser (`api/issues/search`, `api/hotspots/search`).

use super::traits::{ParseError, ParsedWarnings, WarningParser};
use crate::model::{IdSequence, Priority, WarningRecord};
use crate::utils::paths;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SonarExport {
    issues: Option<Vec<SonarFinding>>,
    hotspots: Option<Vec<SonarFinding>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SonarFinding {
    key: String,
    component: String,
    #[serde(default)]
    project: String,
    #[serde(default)]
    message: String,
    rule: Option<String>,
    rule_key: Option<String>,
    severity: Option<String>,
    vulnerability_probability: Option<String>,
    line: Option<u32>,
    text_range: Option<TextRange>,
    resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextRange {
    start_line: u32,
}

/// Parser for SonarQube issue and security-hotspot exports.
///
/// Findings that carry a `resolution` were closed on the server and come out
/// suppressed. With a server URL set, each description ends with a link to
/// the finding.
#[derive(Debug, Default, Clone)]
pub struct SonarQubeParser {
    server_url: Option<String>,
}

impl SonarQubeParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    fn link(&self, finding: &SonarFinding, hotspot: bool) -> Option<String> {
        let server = self.server_url.as_deref()?;
        Some(if hotspot {
            format!(
                "{server}/security_hotspots?id={}&hotspots={}",
                finding.project, finding.key
            )
        } else {
            format!("{server}/project/issues?id={}&open={}", finding.project, finding.key)
        })
    }
}

impl WarningParser for SonarQubeParser {
    fn parse_str(&self, content: &str, source_root: &Path) -> Result<ParsedWarnings, ParseError> {
        let mut parsed = ParsedWarnings::default();
        if content.trim().is_empty() {
            return Ok(parsed);
        }
        let export: SonarExport = serde_json::from_str(content)?;
        let (findings, hotspot) = match (export.issues, export.hotspots) {
            (Some(issues), _) => (issues, false),
            (None, Some(hotspots)) => (hotspots, true),
            (None, None) => return Err(ParseError::MissingField("issues".to_string())),
        };

        let mut ids = IdSequence::new("sonarqube");
        for finding in findings {
            // Components are "<project>:<path>".
            let relative = finding.component.rsplit(':').next().unwrap_or_default();
            let mut description: Vec<String> = finding
                .message
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect();
            description.extend(self.link(&finding, hotspot));

            let line = finding
                .line
                .or_else(|| finding.text_range.as_ref().map(|r| r.start_line))
                .unwrap_or(0);
            let priority = severity_priority(
                finding
                    .vulnerability_probability
                    .as_deref()
                    .or(finding.severity.as_deref())
                    .unwrap_or("low"),
            );
            let query = finding.rule.or(finding.rule_key).unwrap_or_default();

            parsed.records.push(
                WarningRecord::new(
                    ids.next_id(),
                    paths::resolve(Path::new(relative), source_root),
                    line,
                    description,
                )
                .with_priority(priority)
                .with_query(query)
                .with_suppressed(finding.resolution.is_some()),
            );
        }
        Ok(parsed)
    }

    fn format_name(&self) -> &str {
        "SonarQube JSON"
    }
}

fn severity_priority(severity: &str) -> Priority {
    match severity.to_ascii_lowercase().as_str() {
        "blocker" | "critical" | "high" => Priority::High,
        "major" | "medium" => Priority::Med,
        _ => Priority::Low,
    }
}
