use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "policy-doctor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Diagnose non-compliant ACM policies")]
#[command(long_about = "Explains why an Advanced Cluster Management policy is non-compliant: locates the root and propagated policies, classifies each violation, attaches the desired state it was checked against and suggests the next tool call for the investigation.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Kubeconfig context of the hub cluster
    #[arg(long, global = true, value_name = "CONTEXT", env = "POLICY_DOCTOR_CONTEXT")]
    pub context: Option<String>,
}

/// Arguments shared by every policy command
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Name of the policy
    #[arg(value_name = "POLICY")]
    pub policy_name: String,

    /// Namespace of the root policy (searched for when omitted)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Only report this managed cluster
    #[arg(long, value_name = "CLUSTER")]
    pub cluster: Option<String>,

    /// Read policies from exported YAML/JSON manifests instead of the hub
    #[arg(long = "from-file", value_name = "FILE")]
    pub from_file: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every violation of a policy and suggest next steps
    Diagnose {
        #[command(flatten)]
        args: PolicyArgs,
    },

    /// Quick compliance status and raw violation messages
    Inspect {
        #[command(flatten)]
        args: PolicyArgs,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
