//! Per-cluster diagnosis of a root policy.
//!
//! The diagnoser resolves the root policy, indexes its desired state once,
//! then walks every non-compliant managed cluster, reading the propagated
//! copy of the policy in that cluster's namespace. Each non-compliant
//! template detail becomes one [`Violation`].

use super::access::{POLICY, ResourceAccess};
use super::accessor::ValueExt;
use super::classifier::classify_message;
use super::desired_state::DesiredStateIndex;
use super::matcher::match_desired_state;
use super::parser::parse_violation_resource;
use super::resolver::{cancellable, resolve_policy};
use super::suggest::{SuggestionSettings, build_suggestion};
use super::types::{COMPLIANT, ClusterCompliance, ClusterDiagnosis, Diagnosis, Violation, ViolationType};
use crate::common::{CancelSignal, generate_request_id};
use crate::error::{PolicyDoctorError, Result};
use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_MAX_MESSAGE_LEN: usize = 300;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Tunables for a diagnosis run.
#[derive(Debug, Clone)]
pub struct DiagnosisSettings {
    /// Stored messages longer than this many characters are cut and get `...`
    pub max_message_len: usize,
    /// Upper bound on propagated-policy fetches in flight
    pub max_concurrent_fetches: usize,
    pub suggestions: SuggestionSettings,
}

impl Default for DiagnosisSettings {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            suggestions: SuggestionSettings::default(),
        }
    }
}

/// What to diagnose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnoseRequest {
    pub policy_name: String,
    /// Namespace of the root policy; searched for when absent
    pub namespace: Option<String>,
    /// Restrict the report to one managed cluster
    pub cluster: Option<String>,
}

impl DiagnoseRequest {
    pub fn new(policy_name: impl Into<String>) -> Self {
        Self {
            policy_name: policy_name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.policy_name.trim().is_empty() {
            return Err(PolicyDoctorError::InvalidArguments(
                "'policy_name' is required".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn cluster_filter(&self) -> Option<&str> {
        self.cluster.as_deref().filter(|c| !c.is_empty())
    }
}

/// Cut a message to `max` characters, appending `...` when anything was dropped.
pub fn truncate_message(message: &str, max: usize) -> String {
    match message.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

/// `<rootNamespace>.<rootPolicyName>`, the name of a propagated copy.
pub fn propagated_policy_name(root_namespace: &str, root_name: &str) -> String {
    format!("{}.{}", root_namespace, root_name)
}

/// Per-cluster `{clustername, compliant}` entries of a root policy.
pub fn cluster_statuses(policy: &Value) -> Vec<ClusterCompliance> {
    policy
        .nested_slice(&["status", "status"])
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| ClusterCompliance {
            cluster_name: entry.nested_str(&["clustername"]).unwrap_or_default().to_string(),
            compliance_state: entry.nested_str(&["compliant"]).unwrap_or_default().to_string(),
        })
        .collect()
}

/// One non-compliant template detail, reduced to what diagnosis uses.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetailRecord<'a> {
    pub template_name: &'a str,
    pub message: &'a str,
}

/// Non-compliant `status.details` entries with their latest history message.
pub(crate) fn non_compliant_details(policy: &Value) -> Vec<DetailRecord<'_>> {
    policy
        .nested_slice(&["status", "details"])
        .iter()
        .filter(|detail| detail.nested_str(&["compliant"]) != Some(COMPLIANT))
        .filter_map(|detail| {
            let latest = detail.nested_slice(&["history"]).first()?;
            if !latest.is_object() {
                return None;
            }
            Some(DetailRecord {
                template_name: detail.nested_str(&["templateMeta", "name"]).unwrap_or_default(),
                message: latest.nested_str(&["message"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// Parse, classify, match and suggest for one history message.
pub fn build_violation(
    template_name: &str,
    message: &str,
    cluster: &str,
    index: &DesiredStateIndex,
    settings: &DiagnosisSettings,
) -> Violation {
    let resource = parse_violation_resource(message);
    let classified = classify_message(message);
    let desired_state =
        match_desired_state(index, template_name, &resource.kind, &resource.name).cloned();
    let suggestion = build_suggestion(&resource, classified, cluster, index, &settings.suggestions);

    Violation {
        violation_type: suggestion.violation_type,
        template_name: template_name.to_string(),
        resource_kind: resource.kind().map(str::to_string),
        resource_name: resource.name().map(str::to_string),
        resource_namespace: resource.namespace().map(str::to_string),
        message: truncate_message(message, settings.max_message_len),
        desired_state,
        suggested_tool_call: suggestion.call,
    }
}

fn violations_from_policy(
    policy: &Value,
    cluster: &str,
    index: &DesiredStateIndex,
    settings: &DiagnosisSettings,
) -> Vec<Violation> {
    non_compliant_details(policy)
        .into_iter()
        .map(|d| build_violation(d.template_name, d.message, cluster, index, settings))
        .collect()
}

fn fetch_failure(propagated_name: &str, cluster: &str) -> Violation {
    Violation {
        violation_type: ViolationType::Unknown,
        template_name: String::new(),
        resource_kind: None,
        resource_name: None,
        resource_namespace: None,
        message: format!(
            "Could not fetch propagated policy {} in namespace {}",
            propagated_name, cluster
        ),
        desired_state: None,
        suggested_tool_call: None,
    }
}

pub fn summarize(clusters: &[ClusterDiagnosis]) -> String {
    let issues: usize = clusters.iter().map(|c| c.issues.len()).sum();
    format!(
        "Found {} issue(s) across {} non-compliant cluster(s). \
         Follow the suggested_tool_call in each issue to continue investigation.",
        issues,
        clusters.len()
    )
}

/// Drives diagnosis requests against a resource access backend.
#[derive(Clone)]
pub struct PolicyDiagnoser {
    access: Arc<dyn ResourceAccess>,
    settings: DiagnosisSettings,
}

impl PolicyDiagnoser {
    pub fn new(access: Arc<dyn ResourceAccess>) -> Self {
        Self::with_settings(access, DiagnosisSettings::default())
    }

    pub fn with_settings(access: Arc<dyn ResourceAccess>, mut settings: DiagnosisSettings) -> Self {
        settings.max_concurrent_fetches = settings.max_concurrent_fetches.max(1);
        Self { access, settings }
    }

    pub fn settings(&self) -> &DiagnosisSettings {
        &self.settings
    }

    pub(crate) fn access(&self) -> &dyn ResourceAccess {
        self.access.as_ref()
    }

    /// Diagnose a policy across its non-compliant clusters.
    pub async fn diagnose(
        &self,
        request: &DiagnoseRequest,
        cancel: &CancelSignal,
    ) -> Result<Diagnosis> {
        if cancel.is_cancelled() {
            return Err(PolicyDoctorError::Cancelled);
        }
        request.validate()?;

        let request_id = generate_request_id();
        let start = Instant::now();
        log::debug!(
            "[{}] Diagnose request: policy={} namespace={:?} cluster={:?}",
            request_id,
            request.policy_name,
            request.namespace,
            request.cluster
        );

        let resolved = resolve_policy(
            self.access(),
            &request.policy_name,
            request.namespace.as_deref(),
            cancel,
            &request_id,
        )
        .await?;
        let policy = &resolved.policy;
        let namespace = resolved.namespace.as_str();

        let index = DesiredStateIndex::extract(policy);
        let compliance_state = policy
            .nested_str(&["status", "compliant"])
            .unwrap_or_default()
            .to_string();
        let filter = request.cluster_filter();
        let statuses = cluster_statuses(policy);

        let clusters = if statuses.is_empty() {
            // A propagated policy lives in its cluster's namespace
            let single = !compliance_state.is_empty()
                && compliance_state != COMPLIANT
                && filter.is_none_or(|c| c == namespace);
            if single {
                vec![ClusterDiagnosis {
                    cluster_name: namespace.to_string(),
                    compliance_state: compliance_state.clone(),
                    issues: violations_from_policy(policy, namespace, &index, &self.settings),
                }]
            } else {
                Vec::new()
            }
        } else {
            let targets: Vec<ClusterCompliance> = statuses
                .into_iter()
                .filter(|s| filter.is_none_or(|c| c == s.cluster_name))
                .filter(|s| s.compliance_state != COMPLIANT)
                .collect();
            let propagated_name = propagated_policy_name(namespace, &request.policy_name);
            let (propagated_name, index, request_id) =
                (propagated_name.as_str(), &index, request_id.as_str());

            stream::iter(targets)
                .map(move |status| {
                    self.diagnose_cluster(status, propagated_name, index, cancel, request_id)
                })
                .buffered(self.settings.max_concurrent_fetches)
                .try_collect::<Vec<_>>()
                .await?
        };

        let summary = summarize(&clusters);
        log::info!(
            "[{}] Diagnosed policy {}/{}: {} cluster(s) in {:?}",
            request_id,
            namespace,
            request.policy_name,
            clusters.len(),
            start.elapsed()
        );

        Ok(Diagnosis {
            policy_name: request.policy_name.clone(),
            namespace: namespace.to_string(),
            compliance_state,
            clusters,
            summary,
        })
    }

    async fn diagnose_cluster(
        &self,
        status: ClusterCompliance,
        propagated_name: &str,
        index: &DesiredStateIndex,
        cancel: &CancelSignal,
        request_id: &str,
    ) -> Result<ClusterDiagnosis> {
        let fetched = cancellable(
            cancel,
            self.access.get(&POLICY, propagated_name, &status.cluster_name),
        )
        .await?;

        let issues = match fetched {
            Ok(propagated) => {
                violations_from_policy(&propagated, &status.cluster_name, index, &self.settings)
            }
            Err(e) => {
                log::debug!(
                    "[{}] Could not fetch propagated policy {} for cluster {}: {}",
                    request_id,
                    propagated_name,
                    status.cluster_name,
                    e
                );
                vec![fetch_failure(propagated_name, &status.cluster_name)]
            }
        };

        Ok(ClusterDiagnosis {
            cluster_name: status.cluster_name,
            compliance_state: status.compliance_state,
            issues,
        })
    }
}
