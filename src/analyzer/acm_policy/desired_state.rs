//! Desired-state extraction from ConfigurationPolicy templates.
//!
//! A root policy wraps one or more `ConfigurationPolicy` objects, each of
//! which lists `object-templates` describing resources as the operator wants
//! them. This module indexes those embedded definitions so violations can
//! be paired with the resource they were measured against.

use super::accessor::ValueExt;
use serde_json::Value;
use std::collections::BTreeMap;

/// Kind of policy template that carries object templates.
pub const CONFIGURATION_POLICY_KIND: &str = "ConfigurationPolicy";

/// Index key: which template declared which resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DesiredStateKey {
    pub template_name: String,
    pub kind: String,
    pub name: String,
}

impl DesiredStateKey {
    pub fn new(
        template_name: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            template_name: template_name.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

/// Embedded desired resources keyed by `(template, kind, name)`.
///
/// Backed by an ordered map so every lookup walks entries in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredStateIndex {
    entries: BTreeMap<DesiredStateKey, Value>,
}

impl DesiredStateIndex {
    /// Build the index from a root policy. Never fails; anything malformed is skipped.
    pub fn extract(policy: &Value) -> Self {
        let mut index = Self::default();

        for template in policy.nested_slice(&["spec", "policy-templates"]) {
            let Some(definition) = template.nested(&["objectDefinition"]).filter(|d| d.is_object())
            else {
                continue;
            };
            if definition.nested_str(&["kind"]) != Some(CONFIGURATION_POLICY_KIND) {
                continue;
            }
            let template_name = definition.object_name();

            for object_template in definition.nested_slice(&["spec", "object-templates"]) {
                let Some(desired) = object_template
                    .nested(&["objectDefinition"])
                    .filter(|d| d.is_object())
                else {
                    continue;
                };
                let kind = desired.nested_str(&["kind"]).unwrap_or_default();
                index.insert(
                    DesiredStateKey::new(template_name, kind, desired.object_name()),
                    desired.clone(),
                );
            }
        }

        log::debug!("Extracted {} desired-state fragment(s)", index.len());
        index
    }

    pub fn insert(&mut self, key: DesiredStateKey, desired: Value) {
        self.entries.insert(key, desired);
    }

    pub fn get(&self, key: &DesiredStateKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DesiredStateKey, &Value)> {
        self.entries.iter()
    }

    /// Entries declared by one template.
    pub fn for_template<'a, 'b>(
        &'a self,
        template_name: &'b str,
    ) -> impl Iterator<Item = (&'a DesiredStateKey, &'a Value)> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.template_name == template_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_policy() -> Value {
        json!({
            "metadata": {"name": "common-subscriptions", "namespace": "ztp-common"},
            "spec": {
                "policy-templates": [
                    {
                        "objectDefinition": {
                            "apiVersion": "policy.open-cluster-management.io/v1",
                            "kind": "ConfigurationPolicy",
                            "metadata": {"name": "common-subscriptions-config"},
                            "spec": {
                                "object-templates": [
                                    {
                                        "complianceType": "musthave",
                                        "objectDefinition": {
                                            "apiVersion": "operators.coreos.com/v1alpha1",
                                            "kind": "Subscription",
                                            "metadata": {"name": "sriov-network-operator-subscription", "namespace": "openshift-sriov-network-operator"},
                                            "spec": {"channel": "stable"}
                                        }
                                    },
                                    {
                                        "complianceType": "musthave",
                                        "objectDefinition": {
                                            "apiVersion": "v1",
                                            "kind": "Namespace",
                                            "metadata": {"name": "openshift-sriov-network-operator"}
                                        }
                                    },
                                    {"complianceType": "musthave"},
                                    "not-an-object"
                                ]
                            }
                        }
                    },
                    {
                        "objectDefinition": {
                            "apiVersion": "policy.open-cluster-management.io/v1beta1",
                            "kind": "OperatorPolicy",
                            "metadata": {"name": "operator-policy"},
                            "spec": {
                                "object-templates": [
                                    {"objectDefinition": {"kind": "Subscription", "metadata": {"name": "ignored"}}}
                                ]
                            }
                        }
                    },
                    {"extraDependencies": []}
                ]
            }
        })
    }

    #[test]
    fn test_extracts_configuration_policy_objects() {
        let index = DesiredStateIndex::extract(&root_policy());
        assert_eq!(index.len(), 2);

        let key = DesiredStateKey::new(
            "common-subscriptions-config",
            "Subscription",
            "sriov-network-operator-subscription",
        );
        let sub = index.get(&key).unwrap();
        assert_eq!(sub["spec"]["channel"], "stable");

        assert!(index
            .get(&DesiredStateKey::new("operator-policy", "Subscription", "ignored"))
            .is_none());
    }

    #[test]
    fn test_for_template_filters() {
        let index = DesiredStateIndex::extract(&root_policy());
        assert_eq!(index.for_template("common-subscriptions-config").count(), 2);
        assert_eq!(index.for_template("other").count(), 0);
    }

    #[test]
    fn test_malformed_policy_yields_empty_index() {
        assert!(DesiredStateIndex::extract(&json!({})).is_empty());
        assert!(DesiredStateIndex::extract(&json!({"spec": {"policy-templates": "nope"}})).is_empty());
        assert!(DesiredStateIndex::extract(&json!(null)).is_empty());
    }

    #[test]
    fn test_same_resource_in_two_templates_is_kept_twice() {
        let policy = json!({
            "spec": {"policy-templates": [
                {"objectDefinition": {"kind": "ConfigurationPolicy", "metadata": {"name": "a"},
                    "spec": {"object-templates": [{"objectDefinition": {"kind": "Node", "metadata": {"name": "n1"}}}]}}},
                {"objectDefinition": {"kind": "ConfigurationPolicy", "metadata": {"name": "b"},
                    "spec": {"object-templates": [{"objectDefinition": {"kind": "Node", "metadata": {"name": "n1"}}}]}}}
            ]}
        });
        let index = DesiredStateIndex::extract(&policy);
        assert_eq!(index.len(), 2);
    }
}
