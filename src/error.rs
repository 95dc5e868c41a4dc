//! Error types for policy diagnosis.
//!
//! Each layer keeps its own `thiserror` enum (`AccessError` for the resource
//! access seam, `ConfigError` for configuration) and converts into
//! `PolicyDoctorError` at the request boundary.

use crate::analyzer::acm_policy::AccessError;
use thiserror::Error;

/// Top-level error for a diagnose or inspect request.
#[derive(Debug, Error)]
pub enum PolicyDoctorError {
    /// The request was called with invalid parameters
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// No policy with the given name exists in any namespace
    #[error("{}", not_found_message(.name, .namespace.as_deref()))]
    PolicyNotFound {
        name: String,
        namespace: Option<String>,
    },

    /// The caller cancelled the request before it completed
    #[error("operation canceled")]
    Cancelled,

    #[error("resource access failed: {0}")]
    Access(#[from] AccessError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, PolicyDoctorError>;

fn not_found_message(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!(
            "policy \"{}\" not found in namespace \"{}\" or any other namespace",
            name, ns
        ),
        None => format!("policy \"{}\" not found in any namespace", name),
    }
}

impl PolicyDoctorError {
    /// Whether the request ended because the caller gave up.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Render the error for the person running the tool.
    pub fn user_message(&self) -> String {
        match self {
            Self::Cancelled => "Operation was canceled before completion.".to_string(),
            Self::Access(AccessError::InferConfig(_)) | Self::Access(AccessError::Kubeconfig(_)) => {
                format!(
                    "Failed to connect to the hub cluster. \
                     Please verify in-cluster config or the KUBECONFIG environment variable. ({})",
                    self
                )
            }
            Self::PolicyNotFound { .. } => format!(
                "{}. Check the policy name, or pass --namespace to narrow the search.",
                self
            ),
            _ => self.to_string(),
        }
    }
}
