//! # ACM Policy Doctor
//!
//! Diagnoses why an Advanced Cluster Management policy is non-compliant.
//!
//! ## Features
//!
//! - **Policy resolution**: finds a policy by name, searching every namespace when needed
//! - **Violation parsing**: turns free-text status history into kind, name and namespace
//! - **Classification**: missing resources, drift, stuck OLM installs and unserved kinds
//! - **Desired state**: attaches the template fragment each violation was checked against
//! - **Next steps**: a concrete tool call to continue the investigation
//!
//! ## Example
//!
//! ```rust,no_run
//! use acm_policy_doctor::analyzer::acm_policy::{
//!     DiagnoseRequest, InMemoryResourceAccess, PolicyDiagnoser,
//! };
//! use acm_policy_doctor::common::CancelSignal;
//! use std::sync::Arc;
//!
//! # async fn run() -> acm_policy_doctor::Result<()> {
//! let access = InMemoryResourceAccess::from_files(&["policies.yaml"])?;
//! let diagnoser = PolicyDiagnoser::new(Arc::new(access));
//! let diagnosis = diagnoser
//!     .diagnose(&DiagnoseRequest::new("common-config"), &CancelSignal::never())
//!     .await?;
//! println!("{}", diagnosis.summary);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::acm_policy::{DiagnoseRequest, Diagnosis, PolicyDiagnoser, PolicyInspection};
pub use error::{PolicyDoctorError, Result};
pub use handlers::HubOptions;
use cli::Commands;
use common::CancelSignal;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run_command(command: Commands, options: &HubOptions, cancel: &CancelSignal) -> Result<()> {
    match command {
        Commands::Diagnose { args } => handlers::handle_diagnose(args, options, cancel).await,
        Commands::Inspect { args } => handlers::handle_inspect(args, options, cancel).await,
    }
}
