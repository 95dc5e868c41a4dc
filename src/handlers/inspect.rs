//! Handler for the `inspect` command.

use super::{HubOptions, build_diagnoser, request_from};
use crate::analyzer::acm_policy::PolicyInspection;
use crate::cli::PolicyArgs;
use crate::common::CancelSignal;
use crate::error::Result;

pub async fn run_inspect(
    args: &PolicyArgs,
    options: &HubOptions,
    cancel: &CancelSignal,
) -> Result<PolicyInspection> {
    let request = request_from(args);
    request.validate()?;
    let diagnoser = build_diagnoser(args, options).await?;
    diagnoser.inspect(&request, cancel).await
}

/// Inspect a policy and print the report as JSON.
pub async fn handle_inspect(
    args: PolicyArgs,
    options: &HubOptions,
    cancel: &CancelSignal,
) -> Result<()> {
    let inspection = run_inspect(&args, options, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}
