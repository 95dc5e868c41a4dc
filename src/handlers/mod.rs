// Handler modules
pub mod diagnose;
pub mod inspect;

// Re-export all handler functions
pub use diagnose::handle_diagnose;
pub use inspect::handle_inspect;

use crate::analyzer::acm_policy::{
    InMemoryResourceAccess, KubeResourceAccess, PolicyDiagnoser, ResourceAccess,
};
use crate::cli::PolicyArgs;
use crate::config::types::Config;
use crate::error::Result;
use std::sync::Arc;

/// Where policies are read from and how diagnosis is tuned.
#[derive(Debug, Clone, Default)]
pub struct HubOptions {
    /// Kubeconfig context; overrides `[cluster] context` from the config file
    pub context: Option<String>,
    pub config: Config,
}

impl HubOptions {
    fn context(&self) -> Option<&str> {
        self.context
            .as_deref()
            .or(self.config.cluster.context.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Pick the resource access for a command: exported manifests or the hub.
pub async fn connect(args: &PolicyArgs, options: &HubOptions) -> Result<Arc<dyn ResourceAccess>> {
    if !args.from_file.is_empty() {
        let access = InMemoryResourceAccess::from_files(&args.from_file)?;
        log::info!(
            "Loaded {} object(s) from {} file(s)",
            access.len(),
            args.from_file.len()
        );
        return Ok(Arc::new(access));
    }

    let access = match options.context() {
        Some(context) => KubeResourceAccess::with_context(context).await?,
        None => KubeResourceAccess::new().await?,
    };
    Ok(Arc::new(access))
}

pub(crate) async fn build_diagnoser(
    args: &PolicyArgs,
    options: &HubOptions,
) -> Result<PolicyDiagnoser> {
    let access = connect(args, options).await?;
    Ok(PolicyDiagnoser::with_settings(
        access,
        options.config.diagnosis.to_settings(),
    ))
}

pub(crate) fn request_from(args: &PolicyArgs) -> crate::analyzer::acm_policy::DiagnoseRequest {
    crate::analyzer::acm_policy::DiagnoseRequest {
        policy_name: args.policy_name.clone(),
        namespace: args.namespace.clone().filter(|n| !n.is_empty()),
        cluster: args.cluster.clone().filter(|c| !c.is_empty()),
    }
}
