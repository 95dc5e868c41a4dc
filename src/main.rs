use acm_policy_doctor::{HubOptions, cli::Cli, common::cancel_pair, config, run_command};
use clap::Parser;
use std::process;

/// Exit status after Ctrl+C, as shells report SIGINT.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            process::exit(1);
        }
    };

    let options = HubOptions {
        context: cli.context.clone(),
        config,
    };

    let (cancel_handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling request");
            cancel_handle.cancel();
        }
    });

    if let Err(e) = run_command(cli.command, &options, &cancel).await {
        eprintln!("Error: {}", e.user_message());
        process::exit(if e.is_cancelled() { EXIT_CANCELLED } else { 1 });
    }
}
