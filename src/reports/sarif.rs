//! SARIF 2.0.0 / 2.1.0 writer.

use super::{ReportError, SarifVersion};
use crate::model::sarif::{
    SarifArtifactLocation, SarifBaseUri, SarifCodeFlow, SarifDriver, SarifLevel, SarifLocation,
    SarifLog, SarifMessage, SarifPhysicalLocation, SarifRegion, SarifResources, SarifResult,
    SarifRule, SarifRun, SarifSuppression, SarifThreadFlow, SarifThreadFlowLocation, SarifTool,
    SRCROOT,
};
use crate::model::{CodeFlowStep, WarningRecord};
use crate::utils::paths;
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};
use std::path::Path;

/// Build a single-run SARIF document for `records`.
///
/// File uris are written relative to `source_root` and tagged with the
/// `SRCROOT` base id; files outside the root keep an absolute `file://` uri.
#[must_use]
pub fn build_sarif_log(
    records: &[WarningRecord],
    version: SarifVersion,
    source_root: &Path,
    tool_name: &str,
) -> SarifLog {
    let root = paths::absolute(source_root);
    let rules: IndexSet<&str> = records
        .iter()
        .filter_map(|r| r.query.as_deref())
        .collect();

    let mut tool = SarifTool::default();
    let mut resources = None;
    match version {
        SarifVersion::V2_1_0 => {
            tool.driver = Some(SarifDriver {
                name: tool_name.to_string(),
                version: None,
                rules: rules.iter().map(|q| rule(q)).collect(),
            });
        }
        SarifVersion::V2_0_0 => {
            tool.name = Some(tool_name.to_string());
            resources = Some(SarifResources {
                rules: rules.iter().map(|q| ((*q).to_string(), rule(q))).collect(),
            });
        }
    }

    let mut base_ids = IndexMap::new();
    base_ids.insert(
        SRCROOT.to_string(),
        SarifBaseUri::Location(SarifArtifactLocation::uri(root_uri(&root))),
    );

    let results = records
        .iter()
        .map(|record| result_for(record, version, &root))
        .collect();

    SarifLog {
        schema: Some(version.schema().to_string()),
        version: version.as_str().to_string(),
        runs: vec![SarifRun {
            tool,
            original_uri_base_ids: Some(base_ids),
            resources,
            results,
            ..SarifRun::default()
        }],
    }
}

/// Serialize `records` as a pretty-printed SARIF document.
pub fn serialize_sarif(
    records: &[WarningRecord],
    version: SarifVersion,
    source_root: &Path,
    tool_name: &str,
) -> Result<String, ReportError> {
    let log = build_sarif_log(records, version, source_root, tool_name);
    serde_json::to_string_pretty(&log).map_err(|e| ReportError::SerializationError(e.to_string()))
}

/// Merge the first run of `a` and of `b` into one document of `version`.
///
/// Runs are carried over unchanged; a document whose version differs from
/// the requested one is merged anyway and reported with a warning.
pub fn merge_sarif(a: &SarifLog, b: &SarifLog, version: SarifVersion) -> SarifLog {
    for log in [a, b] {
        if log.version != version.as_str() {
            tracing::warn!(
                "Merging SARIF {} document into a {} document; runs are not converted",
                log.version,
                version
            );
        }
    }
    let runs: Vec<SarifRun> = [a, b]
        .into_iter()
        .filter_map(|log| log.runs.first().cloned())
        .collect();
    tracing::debug!("Merged {} SARIF runs", runs.len());
    SarifLog {
        schema: Some(version.schema().to_string()),
        version: version.as_str().to_string(),
        runs,
    }
}

/// Text variant of [`merge_sarif`].
///
/// Runs are copied as raw JSON, so properties this crate does not model
/// survive the merge.
pub fn merge_sarif_str(a: &str, b: &str, version: SarifVersion) -> Result<String, ReportError> {
    let mut runs = Vec::with_capacity(2);
    for (text, which) in [(a, "first"), (b, "second")] {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| ReportError::SarifError(format!("{which} document is not JSON: {e}")))?;
        let declared = doc.get("version").and_then(Value::as_str).unwrap_or("unknown");
        if declared != version.as_str() {
            tracing::warn!(
                "SARIF versions mismatched: {which} document is {declared}, writing {version}"
            );
        }
        let run = doc
            .get("runs")
            .and_then(|runs| runs.get(0))
            .cloned()
            .ok_or_else(|| ReportError::SarifError(format!("{which} document has no runs")))?;
        runs.push(run);
    }
    let merged = json!({
        "$schema": version.schema(),
        "version": version.as_str(),
        "runs": runs,
    });
    serde_json::to_string_pretty(&merged).map_err(|e| ReportError::SerializationError(e.to_string()))
}

fn rule(query: &str) -> SarifRule {
    SarifRule {
        id: query.to_string(),
        short_description: Some(SarifMessage::text(query)),
        full_description: None,
    }
}

fn root_uri(root: &Path) -> String {
    let root = paths::to_slash(root);
    format!("file://{}/", root.trim_end_matches('/'))
}

fn result_for(record: &WarningRecord, version: SarifVersion, root: &Path) -> SarifResult {
    let location = SarifLocation {
        physical_location: Some(physical(&record.file, record.line, version, root)),
        message: None,
    };
    let code_flows = if record.code_flow.is_empty() {
        Vec::new()
    } else {
        vec![SarifCodeFlow {
            thread_flows: vec![SarifThreadFlow {
                locations: record
                    .code_flow
                    .iter()
                    .map(|step| step_location(step, version, root))
                    .collect(),
            }],
        }]
    };
    let suppressions = if record.suppressed {
        vec![SarifSuppression {
            kind: Some("external".to_string()),
        }]
    } else {
        Vec::new()
    };

    SarifResult {
        rule_id: record.query.clone(),
        level: Some(SarifLevel::Warning),
        message: SarifMessage::text(record.description.join(" ")),
        rank: record.priority.sarif_rank(),
        locations: Some(vec![location]),
        code_flows,
        suppressions,
        hosted_viewer_uri: None,
    }
}

fn step_location(step: &CodeFlowStep, version: SarifVersion, root: &Path) -> SarifThreadFlowLocation {
    SarifThreadFlowLocation {
        location: Some(SarifLocation {
            physical_location: Some(physical(&step.file, step.line, version, root)),
            message: Some(SarifMessage::text(step.description.as_str())),
        }),
    }
}

fn physical(file: &Path, line: u32, version: SarifVersion, root: &Path) -> SarifPhysicalLocation {
    let artifact = artifact_location(file, root);
    let region = (line > 0).then(|| SarifRegion {
        start_line: Some(i64::from(line)),
    });
    match version {
        SarifVersion::V2_1_0 => SarifPhysicalLocation {
            artifact_location: Some(artifact),
            file_location: None,
            region,
        },
        SarifVersion::V2_0_0 => SarifPhysicalLocation {
            artifact_location: None,
            file_location: Some(artifact),
            region,
        },
    }
}

fn artifact_location(file: &Path, root: &Path) -> SarifArtifactLocation {
    let relative = paths::relativize(file, root);
    if relative.is_relative() {
        SarifArtifactLocation {
            uri_base_id: Some(SRCROOT.to_string()),
            ..SarifArtifactLocation::uri(paths::to_slash(&relative))
        }
    } else {
        SarifArtifactLocation::uri(format!("file://{}", paths::to_slash(&relative)))
    }
}
