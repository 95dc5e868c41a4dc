//! Next-step suggestions for classified violations.
//!
//! Each violation gets at most one suggested tool call on the companion
//! cluster-inspection server: an OLM trace for operator install chains, a
//! `resources_get` when the exact object is known, or a `resources_list`
//! when only the kind is.

use super::accessor::ValueExt;
use super::classifier::{is_olm_kind, is_operator_kind};
use super::desired_state::DesiredStateIndex;
use super::parser::ParsedResource;
use super::types::{SuggestedToolCall, ViolationType};
use serde_json::{Map, Value};

pub const TOOL_TRACE_OLM_SUBSCRIPTION: &str = "trace_olm_subscription";
pub const TOOL_RESOURCES_GET: &str = "resources_get";
pub const TOOL_RESOURCES_LIST: &str = "resources_list";

/// Settings the builder needs from configuration.
#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    /// Server that hosts the suggested tools
    pub server: String,
    /// Namespace assumed for subscriptions when none is known
    pub default_operator_namespace: String,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            server: "openshift-mcp-server".to_string(),
            default_operator_namespace: "openshift-operators".to_string(),
        }
    }
}

/// Outcome of the builder: the final classification and the call, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub violation_type: ViolationType,
    pub call: Option<SuggestedToolCall>,
}

/// Subscription coordinates used for an OLM trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRef {
    pub name: String,
    pub namespace: String,
}

/// First `Subscription` declared anywhere in the desired state.
pub fn find_subscription(index: &DesiredStateIndex) -> Option<SubscriptionRef> {
    index.iter().find_map(|(_, desired)| {
        let kind = desired.nested_str(&["kind"])?;
        if !kind.eq_ignore_ascii_case("Subscription") {
            return None;
        }
        let name = desired.object_name();
        if name.is_empty() {
            return None;
        }
        Some(SubscriptionRef {
            name: name.to_string(),
            namespace: desired.object_namespace().to_string(),
        })
    })
}

/// Build the suggestion for a violation.
///
/// An OLM signal (message classified `olm_stuck`, or an OLM resource kind)
/// with a known resource name switches the violation to `olm_stuck` and
/// suggests tracing the subscription. Otherwise the classification is kept.
pub fn build_suggestion(
    resource: &ParsedResource,
    classified: ViolationType,
    cluster: &str,
    index: &DesiredStateIndex,
    settings: &SuggestionSettings,
) -> Suggestion {
    let olm_signal = classified == ViolationType::OlmStuck || is_olm_kind(&resource.kind);

    match (resource.kind(), resource.name()) {
        (_, Some(name)) if olm_signal => Suggestion {
            violation_type: ViolationType::OlmStuck,
            call: Some(olm_trace_call(
                &resource.kind,
                name,
                resource.namespace(),
                cluster,
                index,
                settings,
            )),
        },
        (Some(kind), Some(name)) => {
            let mut args = Map::new();
            args.insert(
                "resource".into(),
                Value::from(format!("{}/{}", kind.to_lowercase(), name)),
            );
            Suggestion {
                violation_type: classified,
                call: Some(cluster_call(TOOL_RESOURCES_GET, args, resource, cluster, settings)),
            }
        }
        (Some(kind), None) => {
            let mut args = Map::new();
            args.insert("resource".into(), Value::from(kind.to_lowercase()));
            Suggestion {
                violation_type: classified,
                call: Some(cluster_call(TOOL_RESOURCES_LIST, args, resource, cluster, settings)),
            }
        }
        _ => Suggestion {
            violation_type: classified,
            call: None,
        },
    }
}

fn cluster_call(
    tool: &str,
    mut args: Map<String, Value>,
    resource: &ParsedResource,
    cluster: &str,
    settings: &SuggestionSettings,
) -> SuggestedToolCall {
    args.insert("cluster".into(), Value::from(cluster));
    if let Some(ns) = resource.namespace() {
        args.insert("namespace".into(), Value::from(ns));
    }
    args.insert("clean_metadata".into(), Value::Bool(true));
    SuggestedToolCall {
        server: settings.server.clone(),
        tool: tool.to_string(),
        args,
    }
}

fn olm_trace_call(
    kind: &str,
    name: &str,
    namespace: Option<&str>,
    cluster: &str,
    index: &DesiredStateIndex,
    settings: &SuggestionSettings,
) -> SuggestedToolCall {
    let mut sub_name = name.to_string();
    let mut sub_namespace = namespace.unwrap_or_default().to_string();

    // An Operator CR is named after the subscription it aggregates
    if is_operator_kind(kind) {
        if let Some(sub) = find_subscription(index) {
            sub_name = sub.name;
            if !sub.namespace.is_empty() {
                sub_namespace = sub.namespace;
            }
        } else if let Some((n, ns)) = name.split_once('.') {
            sub_name = n.to_string();
            sub_namespace = ns.to_string();
        }
    }

    if sub_namespace.is_empty() {
        sub_namespace = settings.default_operator_namespace.clone();
    }

    let mut args = Map::new();
    args.insert("subscription_name".into(), Value::from(sub_name));
    args.insert("subscription_namespace".into(), Value::from(sub_namespace));
    args.insert("cluster".into(), Value::from(cluster));

    SuggestedToolCall {
        server: settings.server.clone(),
        tool: TOOL_TRACE_OLM_SUBSCRIPTION.to_string(),
        args,
    }
}
