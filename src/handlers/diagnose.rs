//! Handler for the `diagnose` command.

use super::{HubOptions, build_diagnoser, request_from};
use crate::analyzer::acm_policy::Diagnosis;
use crate::cli::PolicyArgs;
use crate::common::CancelSignal;
use crate::error::Result;

/// Run a diagnosis and return the report.
pub async fn run_diagnose(
    args: &PolicyArgs,
    options: &HubOptions,
    cancel: &CancelSignal,
) -> Result<Diagnosis> {
    let request = request_from(args);
    request.validate()?;
    let diagnoser = build_diagnoser(args, options).await?;
    diagnoser.diagnose(&request, cancel).await
}

/// Diagnose a policy and print the report as JSON.
pub async fn handle_diagnose(
    args: PolicyArgs,
    options: &HubOptions,
    cancel: &CancelSignal,
) -> Result<()> {
    let diagnosis = run_diagnose(&args, options, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    Ok(())
}
