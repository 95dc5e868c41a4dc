//! Locating a policy by name, with or without its namespace.

use super::access::{POLICY, ResourceAccess};
use super::accessor::ValueExt;
use crate::common::CancelSignal;
use crate::error::{PolicyDoctorError, Result};
use serde_json::Value;

/// A policy object together with the namespace it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolicy {
    pub policy: Value,
    pub namespace: String,
}

/// Await a fetch unless the request is cancelled first.
pub(crate) async fn cancellable<T>(
    cancel: &CancelSignal,
    fetch: impl std::future::Future<Output = T>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(PolicyDoctorError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PolicyDoctorError::Cancelled),
        result = fetch => Ok(result),
    }
}

/// Find a policy.
///
/// With a namespace, a direct get is tried first. If that misses, or no
/// namespace was given, every namespace is searched and the first policy
/// with a matching name wins.
pub async fn resolve_policy(
    access: &dyn ResourceAccess,
    name: &str,
    namespace: Option<&str>,
    cancel: &CancelSignal,
    request_id: &str,
) -> Result<ResolvedPolicy> {
    let namespace = namespace.filter(|ns| !ns.is_empty());

    if let Some(ns) = namespace {
        match cancellable(cancel, access.get(&POLICY, name, ns)).await? {
            Ok(policy) => {
                return Ok(ResolvedPolicy {
                    policy,
                    namespace: ns.to_string(),
                });
            }
            Err(e) => {
                log::info!(
                    "[{}] Policy {} not found in namespace {} ({}), searching all namespaces",
                    request_id,
                    name,
                    ns,
                    e
                );
            }
        }
    }

    let policies = cancellable(cancel, access.list(&POLICY, None)).await??;

    match policies.into_iter().find(|p| p.object_name() == name) {
        Some(policy) => {
            let resolved_ns = policy.object_namespace().to_string();
            log::info!(
                "[{}] Auto-resolved policy {} to namespace {}",
                request_id,
                name,
                resolved_ns
            );
            Ok(ResolvedPolicy {
                policy,
                namespace: resolved_ns,
            })
        }
        None => Err(PolicyDoctorError::PolicyNotFound {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::acm_policy::access::InMemoryResourceAccess;
    use crate::common::cancel_pair;
    use serde_json::json;

    fn policy(name: &str, namespace: &str) -> Value {
        json!({
            "apiVersion": "policy.open-cluster-management.io/v1",
            "kind": "Policy",
            "metadata": {"name": name, "namespace": namespace}
        })
    }

    fn access() -> InMemoryResourceAccess {
        InMemoryResourceAccess::new(vec![
            policy("common-config", "ztp-common"),
            policy("ztp-common.common-config", "spoke-1"),
        ])
    }

    #[tokio::test]
    async fn test_direct_lookup() {
        let resolved = resolve_policy(&access(), "common-config", Some("ztp-common"), &CancelSignal::never(), "t")
            .await
            .unwrap();
        assert_eq!(resolved.namespace, "ztp-common");
    }

    #[tokio::test]
    async fn test_search_without_namespace() {
        let resolved = resolve_policy(&access(), "ztp-common.common-config", None, &CancelSignal::never(), "t")
            .await
            .unwrap();
        assert_eq!(resolved.namespace, "spoke-1");
    }

    #[tokio::test]
    async fn test_wrong_namespace_falls_back_to_search() {
        let resolved = resolve_policy(&access(), "common-config", Some("wrong"), &CancelSignal::never(), "t")
            .await
            .unwrap();
        assert_eq!(resolved.namespace, "ztp-common");
    }

    #[tokio::test]
    async fn test_not_found_reports_attempted_namespace() {
        let err = resolve_policy(&access(), "missing", Some("ztp-common"), &CancelSignal::never(), "t")
            .await
            .unwrap_err();
        match err {
            PolicyDoctorError::PolicyNotFound { name, namespace } => {
                assert_eq!(name, "missing");
                assert_eq!(namespace.as_deref(), Some("ztp-common"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let (handle, signal) = cancel_pair();
        handle.cancel();
        let err = resolve_policy(&access(), "common-config", None, &signal, "t")
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
