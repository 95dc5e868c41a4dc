//! ACM Policy Non-Compliance Analyzer
//!
//! Explains why an Advanced Cluster Management policy is non-compliant.
//! A root policy on the hub embeds `ConfigurationPolicy` templates and
//! records per-cluster compliance; a propagated copy named
//! `<rootNamespace>.<rootName>` in each managed cluster's namespace carries
//! the detailed violation history.
//!
//! # Pipeline
//!
//! 1. Resolve the root policy, searching every namespace when needed
//! 2. Index the desired state declared by its object templates
//! 3. For each non-compliant cluster, read the propagated policy and turn
//!    the latest history message of each non-compliant template into a
//!    [`Violation`]: parse, classify, match desired state, suggest a next
//!    tool call
//!
//! # Example
//!
//! ```rust,ignore
//! use acm_policy_doctor::analyzer::acm_policy::{
//!     DiagnoseRequest, KubeResourceAccess, PolicyDiagnoser,
//! };
//! use acm_policy_doctor::common::CancelSignal;
//! use std::sync::Arc;
//!
//! let access = KubeResourceAccess::new().await?;
//! let diagnoser = PolicyDiagnoser::new(Arc::new(access));
//! let request = DiagnoseRequest::new("common-subscriptions").with_namespace("ztp-common");
//! let diagnosis = diagnoser.diagnose(&request, &CancelSignal::never()).await?;
//! println!("{}", diagnosis.summary);
//! ```
//!
//! # Violation taxonomy
//!
//! - `resource_missing`: the expected object does not exist
//! - `resource_drift`: the object exists but differs from the template
//! - `olm_stuck`: an operator install chain has not converged
//! - `crd_missing`: the cluster does not serve the API kind
//! - `unknown`: anything else, including unreadable propagated policies

// ============================================================================
// Resource access
// ============================================================================

/// Typed, non-panicking getters over untyped object trees.
pub mod accessor;

/// The resource-access seam and its in-memory implementation.
pub mod access;

/// `ResourceAccess` backed by a live hub cluster.
pub mod kube_access;

// ============================================================================
// Violation pipeline
// ============================================================================

pub mod types;

pub mod desired_state;

pub mod parser;

pub mod classifier;

pub mod matcher;

pub mod suggest;

// ============================================================================
// Request drivers
// ============================================================================

pub mod resolver;

pub mod aggregator;

pub mod inspect;

// ============================================================================
// Re-exports
// ============================================================================

pub use access::{AccessError, InMemoryResourceAccess, POLICY, ResourceAccess, ResourceType};
pub use accessor::ValueExt;
pub use aggregator::{
    DiagnoseRequest, DiagnosisSettings, PolicyDiagnoser, build_violation, truncate_message,
};
pub use classifier::{classify_message, is_olm_kind};
pub use desired_state::{DesiredStateIndex, DesiredStateKey};
pub use kube_access::KubeResourceAccess;
pub use matcher::{MatchTier, match_desired_state, match_desired_state_with_tier};
pub use parser::{ParsedResource, parse_violation_resource};
pub use resolver::{ResolvedPolicy, resolve_policy};
pub use suggest::{SuggestionSettings, build_suggestion};
pub use types::{
    ClusterCompliance, ClusterDiagnosis, Diagnosis, InspectedViolation, PolicyInspection,
    SuggestedToolCall, TemplateInfo, Violation, ViolationType,
};
