//! Quick status inspection of a policy.
//!
//! Lighter than diagnosis: the report lists templates, per-cluster compliance
//! and the latest violation messages, without desired state or suggestions.

use super::access::POLICY;
use super::accessor::ValueExt;
use super::aggregator::{
    DiagnoseRequest, PolicyDiagnoser, cluster_statuses, non_compliant_details,
    propagated_policy_name, truncate_message,
};
use super::classifier::classify_message;
use super::parser::parse_violation_resource;
use super::resolver::{cancellable, resolve_policy};
use super::types::{COMPLIANT, ClusterCompliance, InspectedViolation, PolicyInspection, TemplateInfo};
use crate::common::{CancelSignal, generate_request_id};
use crate::error::{PolicyDoctorError, Result};
use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use std::time::Instant;

/// Name and kind of every embedded policy template.
pub fn policy_templates(policy: &Value) -> Vec<TemplateInfo> {
    policy
        .nested_slice(&["spec", "policy-templates"])
        .iter()
        .filter(|t| t.is_object())
        .map(|t| {
            let definition = t.nested(&["objectDefinition"]);
            TemplateInfo {
                name: definition.map(|d| d.object_name()).unwrap_or_default().to_string(),
                kind: definition
                    .and_then(|d| d.nested_str(&["kind"]))
                    .unwrap_or_default()
                    .to_string(),
            }
        })
        .collect()
}

fn inspected_violations(
    policy: &Value,
    cluster: Option<&str>,
    max_message_len: usize,
) -> Vec<InspectedViolation> {
    non_compliant_details(policy)
        .into_iter()
        .map(|detail| {
            let resource = parse_violation_resource(detail.message);
            InspectedViolation {
                template_name: detail.template_name.to_string(),
                cluster_name: cluster.map(str::to_string),
                violation_type: classify_message(detail.message),
                resource_kind: resource.kind().map(str::to_string),
                resource_name: resource.name().map(str::to_string),
                namespace: resource.namespace().map(str::to_string),
                message: truncate_message(detail.message, max_message_len),
            }
        })
        .collect()
}

/// Follow-up instruction pointing at the first affected cluster.
pub fn next_step_instruction(cluster: &str, server: &str) -> String {
    format!(
        "Continue the investigation on the managed cluster. \
         Use {server}'s resources_get or resources_list with cluster='{cluster}' to inspect the violated resources. \
         For OLM-related violations (Subscription, CSV), call trace_olm_subscription with cluster='{cluster}'. \
         Base findings on the actual tool results."
    )
}

impl PolicyDiagnoser {
    /// Inspect a policy's compliance and raw violations.
    pub async fn inspect(
        &self,
        request: &DiagnoseRequest,
        cancel: &CancelSignal,
    ) -> Result<PolicyInspection> {
        if cancel.is_cancelled() {
            return Err(PolicyDoctorError::Cancelled);
        }
        request.validate()?;

        let request_id = generate_request_id();
        let start = Instant::now();
        log::debug!(
            "[{}] Inspect request: policy={} namespace={:?} cluster={:?}",
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
        let max_len = self.settings().max_message_len;

        let compliance_state = policy
            .nested_str(&["status", "compliant"])
            .unwrap_or_default()
            .to_string();
        let filter = request.cluster_filter();

        let statuses: Vec<ClusterCompliance> = cluster_statuses(policy)
            .into_iter()
            .filter(|s| filter.is_none_or(|c| c == s.cluster_name))
            .collect();
        let from_status = !statuses.is_empty();

        let affected_clusters = if from_status {
            statuses
        } else if !namespace.is_empty() {
            // No per-cluster status: a propagated policy, its namespace is the cluster
            vec![ClusterCompliance {
                cluster_name: namespace.to_string(),
                compliance_state: compliance_state.clone(),
            }]
        } else {
            Vec::new()
        };

        let mut violations = inspected_violations(policy, None, max_len);

        if from_status {
            let propagated_name = propagated_policy_name(namespace, &request.policy_name);
            let targets = affected_clusters
                .iter()
                .filter(|c| c.compliance_state != COMPLIANT);

            let (propagated_name, request_id) = (propagated_name.as_str(), request_id.as_str());

            let per_cluster: Vec<Vec<InspectedViolation>> = stream::iter(targets)
                .map(move |cluster| {
                    async move {
                        let fetched = cancellable(
                            cancel,
                            self.access().get(&POLICY, propagated_name, &cluster.cluster_name),
                        )
                        .await?;
                        Ok::<_, PolicyDoctorError>(match fetched {
                            Ok(propagated) => inspected_violations(
                                &propagated,
                                Some(cluster.cluster_name.as_str()),
                                max_len,
                            ),
                            Err(e) => {
                                log::debug!(
                                    "[{}] Skipping cluster {}: {}",
                                    request_id,
                                    cluster.cluster_name,
                                    e
                                );
                                Vec::new()
                            }
                        })
                    }
                })
                .buffered(self.settings().max_concurrent_fetches)
                .try_collect()
                .await?;

            violations.extend(per_cluster.into_iter().flatten());
        }

        let next_step = match affected_clusters.first() {
            Some(first) if !violations.is_empty() => Some(next_step_instruction(
                &first.cluster_name,
                &self.settings().suggestions.server,
            )),
            _ => None,
        };

        log::info!(
            "[{}] Inspected policy {}/{}: {} violation(s) in {:?}",
            request_id,
            namespace,
            request.policy_name,
            violations.len(),
            start.elapsed()
        );

        Ok(PolicyInspection {
            policy_name: request.policy_name.clone(),
            namespace: namespace.to_string(),
            compliance_state,
            affected_clusters,
            templates: policy_templates(policy),
            violations,
            next_step,
        })
    }
}
