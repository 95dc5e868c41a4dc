//! Violation classification.
//!
//! Classification is an ordered list of substring rules over the lower-cased
//! message; the first rule that matches decides the category. Kind-based OLM
//! promotion is a separate step applied by the suggestion builder.

use super::types::ViolationType;

/// A message classification rule.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Rule identifier, used in logs and tests.
    pub id: &'static str,
    /// Lower-case substrings; any one of them triggers the rule.
    pub needles: &'static [&'static str],
    pub outcome: ViolationType,
}

impl ClassificationRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|n| lowered.contains(n))
    }
}

/// Message rules in priority order. Anything unmatched is `Unknown`.
pub const MESSAGE_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        id: "missing",
        needles: &["not found"],
        outcome: ViolationType::ResourceMissing,
    },
    ClassificationRule {
        id: "drift",
        needles: &["not as specified"],
        outcome: ViolationType::ResourceDrift,
    },
    ClassificationRule {
        id: "olm-chain",
        needles: &["installplan", "clusterserviceversion"],
        outcome: ViolationType::OlmStuck,
    },
    ClassificationRule {
        id: "kind-not-served",
        needles: &[
            "no matches for kind",
            "could not find the requested resource",
            "the server doesn't have a resource type",
        ],
        outcome: ViolationType::CrdMissing,
    },
];

/// Resource kinds that belong to an OLM install chain.
const OLM_KINDS: &[&str] = &[
    "Subscription",
    "subscriptions",
    "subscriptions.operators.coreos.com",
    "ClusterServiceVersion",
    "clusterserviceversions",
    "clusterserviceversions.operators.coreos.com",
    "Operator",
    "operators",
    "operators.operators.coreos.com",
    "InstallPlan",
    "installplans",
    "installplans.operators.coreos.com",
    "CatalogSource",
    "catalogsources",
    "catalogsources.operators.coreos.com",
];

/// Kinds naming the aggregate `Operator` resource rather than a Subscription.
const OPERATOR_KINDS: &[&str] = &["Operator", "operators", "operators.operators.coreos.com"];

/// Classify a raw message. First matching rule wins.
pub fn classify_message(message: &str) -> ViolationType {
    let lowered = message.to_lowercase();
    MESSAGE_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.outcome)
        .unwrap_or(ViolationType::Unknown)
}

/// Whether a resource kind belongs to OLM (case-insensitive, singular or plural).
pub fn is_olm_kind(kind: &str) -> bool {
    OLM_KINDS.iter().any(|k| k.eq_ignore_ascii_case(kind))
}

/// Whether a kind is the aggregate `Operator` custom resource.
pub fn is_operator_kind(kind: &str) -> bool {
    OPERATOR_KINDS.iter().any(|k| k.eq_ignore_ascii_case(kind))
}
