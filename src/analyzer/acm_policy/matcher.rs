//! Pairing violations with the desired state they were checked against.
//!
//! ACM reports plural resource types (`nodes`, `operators`) while object
//! templates use the singular `Kind`, so matching falls through three tiers:
//! exact, plural-tolerant, and "the template only declares one thing".

use super::desired_state::{DesiredStateIndex, DesiredStateKey};
use serde_json::Value;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Flexible,
    SoleTemplateEntry,
}

/// Kinds equal modulo naive `s`/`es` pluralisation, ignoring case.
pub fn kinds_match_loosely(declared: &str, reported: &str) -> bool {
    let declared = declared.to_lowercase();
    let reported = reported.to_lowercase();
    declared == reported
        || reported == format!("{declared}s")
        || reported == format!("{declared}es")
        || declared == format!("{reported}s")
        || declared == format!("{reported}es")
}

fn exact(key: &DesiredStateKey, template: &str, kind: &str, name: &str) -> bool {
    key.template_name == template && key.kind.eq_ignore_ascii_case(kind) && key.name == name
}

fn flexible(key: &DesiredStateKey, template: &str, kind: &str, name: &str) -> bool {
    key.template_name == template
        && kinds_match_loosely(&key.kind, kind)
        && (name.is_empty() || key.name == name)
}

/// Find the desired-state fragment for a violation, and the tier that found it.
pub fn match_desired_state_with_tier<'a>(
    index: &'a DesiredStateIndex,
    template_name: &str,
    kind: &str,
    name: &str,
) -> Option<(&'a Value, MatchTier)> {
    if let Some((_, desired)) = index
        .iter()
        .find(|(key, _)| exact(key, template_name, kind, name))
    {
        return Some((desired, MatchTier::Exact));
    }

    if let Some((_, desired)) = index
        .iter()
        .find(|(key, _)| flexible(key, template_name, kind, name))
    {
        return Some((desired, MatchTier::Flexible));
    }

    // Only safe when the template is unambiguous
    let mut candidates = index.for_template(template_name);
    match (candidates.next(), candidates.next()) {
        (Some((_, desired)), None) => Some((desired, MatchTier::SoleTemplateEntry)),
        _ => None,
    }
}

/// Find the desired-state fragment for a violation.
pub fn match_desired_state<'a>(
    index: &'a DesiredStateIndex,
    template_name: &str,
    kind: &str,
    name: &str,
) -> Option<&'a Value> {
    match_desired_state_with_tier(index, template_name, kind, name).map(|(desired, _)| desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> DesiredStateIndex {
        let mut index = DesiredStateIndex::default();
        index.insert(
            DesiredStateKey::new("tpl-nodes", "Node", "worker-1"),
            json!({"kind": "Node", "metadata": {"name": "worker-1"}, "tag": "w1"}),
        );
        index.insert(
            DesiredStateKey::new("tpl-nodes", "Node", "worker-2"),
            json!({"kind": "Node", "metadata": {"name": "worker-2"}, "tag": "w2"}),
        );
        index.insert(
            DesiredStateKey::new("tpl-sub", "Subscription", "sriov"),
            json!({"kind": "Subscription", "metadata": {"name": "sriov"}, "tag": "sub"}),
        );
        index.insert(
            DesiredStateKey::new("tpl-class", "StorageClass", "fast"),
            json!({"kind": "StorageClass", "metadata": {"name": "fast"}, "tag": "sc"}),
        );
        index
    }

    fn tag(v: Option<&Value>) -> Option<&str> {
        v.and_then(|v| v["tag"].as_str())
    }

    #[test]
    fn test_exact_match_ignores_kind_case() {
        let idx = index();
        let (v, tier) = match_desired_state_with_tier(&idx, "tpl-nodes", "node", "worker-2").unwrap();
        assert_eq!(v["tag"], "w2");
        assert_eq!(tier, MatchTier::Exact);
    }

    #[test]
    fn test_plural_kind_matches_flexibly() {
        let idx = index();
        let (v, tier) = match_desired_state_with_tier(&idx, "tpl-nodes", "nodes", "worker-1").unwrap();
        assert_eq!(v["tag"], "w1");
        assert_eq!(tier, MatchTier::Flexible);

        assert_eq!(tag(match_desired_state(&idx, "tpl-class", "storageclasses", "fast")), Some("sc"));
    }

    #[test]
    fn test_flexible_without_name_takes_first_kind_match() {
        let idx = index();
        assert_eq!(tag(match_desired_state(&idx, "tpl-nodes", "nodes", "")), Some("w1"));
    }

    #[test]
    fn test_flexible_requires_name_when_given() {
        let idx = index();
        // Two nodes in the template, neither named worker-9: ambiguous, no match
        assert_eq!(match_desired_state(&idx, "tpl-nodes", "nodes", "worker-9"), None);
    }

    #[test]
    fn test_sole_entry_fallback() {
        let idx = index();
        let (v, tier) = match_desired_state_with_tier(&idx, "tpl-sub", "operators", "web-terminal").unwrap();
        assert_eq!(v["tag"], "sub");
        assert_eq!(tier, MatchTier::SoleTemplateEntry);
        assert_eq!(tag(match_desired_state(&idx, "tpl-sub", "", "")), Some("sub"));
    }

    #[test]
    fn test_sole_entry_outlives_template_name() {
        let idx = index();
        let desired = {
            let template = String::from("tpl-sub");
            match_desired_state(&idx, &template, "operators", "web-terminal")
        };
        assert_eq!(tag(desired), Some("sub"));

        let entries: Vec<_> = {
            let template = String::from("tpl-nodes");
            idx.for_template(&template).map(|(_, v)| v).collect()
        };
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_other_templates_never_match() {
        let idx = index();
        assert_eq!(match_desired_state(&idx, "tpl-missing", "Node", "worker-1"), None);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let idx = index();
        let first = match_desired_state(&idx, "tpl-nodes", "nodes", "");
        for _ in 0..10 {
            assert_eq!(match_desired_state(&idx, "tpl-nodes", "nodes", ""), first);
        }
    }

    #[test]
    fn test_kinds_match_loosely() {
        assert!(kinds_match_loosely("Node", "nodes"));
        assert!(kinds_match_loosely("nodes", "Node"));
        assert!(kinds_match_loosely("StorageClass", "storageclasses"));
        assert!(kinds_match_loosely("Operator", "operators"));
        assert!(!kinds_match_loosely("Node", "namespaces"));
    }
}
