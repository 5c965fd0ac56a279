//! SARIF wire structures.
//!
//! One set of types covers both SARIF 2.0.0 and 2.1.0. Fields that only exist
//! in one version are optional, and everything that is absent on input is
//! skipped on output, so the same structs serve reading and writing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const SARIF_SCHEMA_2_1_0: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
pub const SARIF_SCHEMA_2_0_0: &str =
    "https://schemastore.azurewebsites.net/schemas/json/sarif-2.0.0.json";

/// Key under `originalUriBaseIds` that names the source root.
pub const SRCROOT: &str = "SRCROOT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLog {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub version: String,
    #[serde(default)]
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocations: Option<Vec<SarifInvocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_uri_base_ids: Option<IndexMap<String, SarifBaseUri>>,
    /// 2.1.0 artifact table, addressed by `artifactLocation.index`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<SarifArtifact>>,
    /// 2.0.0 file table: an array of objects or uris, or a map keyed by uri
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<serde_json::Value>,
    /// 2.0.0 rule table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<SarifResources>,
    #[serde(default)]
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifTool {
    /// 2.1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<SarifDriver>,
    /// 2.0.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResources {
    #[serde(default)]
    pub rules: IndexMap<String, SarifRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<SarifMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifInvocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_execution_successful: Option<bool>,
}

impl SarifInvocation {
    /// `false` only when the log explicitly reports a failed run.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.execution_successful
            .or(self.tool_execution_successful)
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SarifArtifactLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<SarifLevel>,
    #[serde(default)]
    pub message: SarifMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<SarifLocation>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_flows: Vec<SarifCodeFlow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressions: Vec<SarifSuppression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_viewer_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SarifMessage {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_location: Option<SarifPhysicalLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<SarifMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    /// 2.1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_location: Option<SarifArtifactLocation>,
    /// 2.0.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_location: Option<SarifArtifactLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

impl SarifPhysicalLocation {
    /// Whichever of the two version-specific location objects is present.
    #[must_use]
    pub fn artifact(&self) -> Option<&SarifArtifactLocation> {
        self.artifact_location.as_ref().or(self.file_location.as_ref())
    }

    #[must_use]
    pub fn start_line(&self) -> u32 {
        self.region
            .as_ref()
            .and_then(|r| r.start_line)
            .and_then(|line| u32::try_from(line).ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_base_id: Option<String>,
    /// 2.1.0 index into `run.artifacts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// 2.0.0 index into `run.files`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_index: Option<usize>,
}

impl SarifArtifactLocation {
    /// Location with only a uri set.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// The uri, if present and non-empty.
    #[must_use]
    pub fn non_empty_uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|u| !u.is_empty())
    }
}

/// An `originalUriBaseIds` entry: a location object, or a bare uri string in
/// early 2.0.0 logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SarifBaseUri {
    Location(SarifArtifactLocation),
    Uri(String),
}

impl SarifBaseUri {
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Location(location) => location.non_empty_uri(),
            Self::Uri(uri) => Some(uri.as_str()).filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifCodeFlow {
    #[serde(default)]
    pub thread_flows: Vec<SarifThreadFlow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifThreadFlow {
    #[serde(default)]
    pub locations: Vec<SarifThreadFlowLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifThreadFlowLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SarifLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifSuppression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    None,
    Note,
    Warning,
    Error,
    #[serde(other)]
    Other,
}
