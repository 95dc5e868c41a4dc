use crate::analyzer::acm_policy::aggregator::{
    DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_MAX_MESSAGE_LEN, DiagnosisSettings,
};
use crate::analyzer::acm_policy::suggest::SuggestionSettings;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diagnosis: DiagnosisConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// Diagnosis tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisConfig {
    /// Characters kept from each violation message before `...`
    pub max_message_len: usize,
    /// Subscription namespace assumed when a message names none
    pub default_operator_namespace: String,
    /// Server named in every suggested tool call
    pub suggestion_server: String,
    /// Propagated-policy fetches allowed in flight at once
    pub max_concurrent_fetches: usize,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            default_operator_namespace: "openshift-operators".to_string(),
            suggestion_server: "openshift-mcp-server".to_string(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl DiagnosisConfig {
    pub fn to_settings(&self) -> DiagnosisSettings {
        DiagnosisSettings {
            max_message_len: self.max_message_len,
            max_concurrent_fetches: self.max_concurrent_fetches,
            suggestions: SuggestionSettings {
                server: self.suggestion_server.clone(),
                default_operator_namespace: self.default_operator_namespace.clone(),
            },
        }
    }
}

/// Hub cluster connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Kubeconfig context; the current context is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}
