//! Lumen CLI
//!
//! Command-line interface for the Lumen image-generation API and the
//! asset optimizer.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Lumen image generation CLI", long_about = None)]
struct Cli {
    /// Generation API URL
    #[arg(long, env = "LUMEN_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// API key
    #[arg(long, env = "LUMEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Milliseconds between status checks while waiting for a job
    #[arg(long, env = "LUMEN_POLL_INTERVAL_MS", default_value_t = 3000)]
    poll_interval_ms: u64,

    /// Status checks before giving up on a job
    #[arg(long, env = "LUMEN_MAX_ATTEMPTS", default_value_t = 60)]
    max_attempts: u32,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config {
        api_url: cli.api_url,
        api_key: cli.api_key,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        max_attempts: cli.max_attempts,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}

/// Logs go to stderr so command output stays pipeable
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "lumen_cli=debug,lumen_client=debug,lumen_optimizer=debug"
    } else {
        "lumen_cli=info,lumen_client=warn,lumen_optimizer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
