//! rostictl - deploy applications to Rosti.cz containers

use clap::Parser;
use rosti_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter.
const LOG_ENV: &str = "ROSTI_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
