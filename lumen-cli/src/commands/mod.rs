//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod billing;
mod generation;
mod optimize;

pub use billing::BillingCommands;
pub use generation::GenerateArgs;
pub use optimize::OptimizeArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate an image from a prompt
    Generate(GenerateArgs),
    /// Show the current status of a generation job
    Status {
        /// Job ID returned by `generate`
        job_id: String,
    },
    /// Wait for an existing generation job to finish
    Wait {
        /// Job ID returned by `generate`
        job_id: String,
    },
    /// List previous generations
    History,
    /// Credits and transactions
    Billing {
        #[command(subcommand)]
        command: BillingCommands,
    },
    /// Optimize a directory of images for the web
    Optimize(OptimizeArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate(args) => generation::generate(args, config).await,
        Commands::Status { job_id } => generation::show_status(&job_id, config).await,
        Commands::Wait { job_id } => generation::wait(&job_id, config).await,
        Commands::History => generation::list_history(config).await,
        Commands::Billing { command } => billing::handle_billing_command(command, config).await,
        Commands::Optimize(args) => optimize::run(args).await,
    }
}
