//! Report types produced by policy diagnosis and inspection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Compliance state string ACM reports for healthy policies and clusters.
pub const COMPLIANT: &str = "Compliant";

/// Category of a single non-compliant fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// The resource the template expects does not exist
    ResourceMissing,
    /// The resource exists but differs from the template
    ResourceDrift,
    /// An OLM subscription chain has not converged
    OlmStuck,
    /// The API kind itself is not served by the cluster
    CrdMissing,
    /// No rule recognised the message
    Unknown,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceMissing => "resource_missing",
            Self::ResourceDrift => "resource_drift",
            Self::OlmStuck => "olm_stuck",
            Self::CrdMissing => "crd_missing",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next tool call an investigator should make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedToolCall {
    pub server: String,
    pub tool: String,
    pub args: Map<String, Value>,
}

/// A classified violation on one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationType,
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_namespace: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tool_call: Option<SuggestedToolCall>,
}

/// Violations found on one managed cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDiagnosis {
    pub cluster_name: String,
    pub compliance_state: String,
    #[serde(default)]
    pub issues: Vec<Violation>,
}

/// Full diagnosis of a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub policy_name: String,
    pub namespace: String,
    pub compliance_state: String,
    #[serde(default)]
    pub clusters: Vec<ClusterDiagnosis>,
    pub summary: String,
}

impl Diagnosis {
    pub fn total_issues(&self) -> usize {
        self.clusters.iter().map(|c| c.issues.len()).sum()
    }
}

// ============================================================================
// Inspect report
// ============================================================================

/// Per-cluster compliance as reported by the root policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCompliance {
    pub cluster_name: String,
    pub compliance_state: String,
}

/// A policy template's name and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    pub kind: String,
}

/// A violation without desired state or suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectedViolation {
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    pub violation_type: ViolationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub message: String,
}

/// Quick status report for a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyInspection {
    pub policy_name: String,
    pub namespace: String,
    pub compliance_state: String,
    #[serde(default)]
    pub affected_clusters: Vec<ClusterCompliance>,
    #[serde(default)]
    pub templates: Vec<TemplateInfo>,
    #[serde(default)]
    pub violations: Vec<InspectedViolation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}
