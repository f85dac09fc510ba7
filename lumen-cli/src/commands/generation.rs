//! Generation command handlers
//!
//! Submitting prompts, checking job status, and waiting for jobs with a
//! live progress line.

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use lumen_client::{ApiClient, ClientError, JobPoller, PollError};
use lumen_core::domain::generation::GenerationRecord;
use lumen_core::domain::job::{JobState, JobStatus};
use lumen_core::dto::generation::GenerationRequest;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;

/// Arguments for `lumen generate`
#[derive(Args)]
pub struct GenerateArgs {
    /// Text prompt describing the image
    pub prompt: String,

    /// Things the image should not contain
    #[arg(long = "negative")]
    pub negative_prompt: Option<String>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1024)]
    pub height: u32,

    /// Style preset name
    #[arg(long)]
    pub style: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Return as soon as the job is queued
    #[arg(long)]
    pub no_wait: bool,
}

impl From<GenerateArgs> for GenerationRequest {
    fn from(args: GenerateArgs) -> Self {
        Self {
            prompt: args.prompt,
            negative_prompt: args.negative_prompt,
            width: args.width,
            height: args.height,
            style: args.style,
            seed: args.seed,
        }
    }
}

/// Submit a prompt and, unless `--no-wait`, wait for the image
pub async fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let client = config.client();
    let no_wait = args.no_wait;
    let request = GenerationRequest::from(args);

    let job = client
        .submit_generation(&request)
        .await
        .context("Failed to submit generation")?;

    println!("{} Job {} queued", "✓".green(), job.id.cyan());

    if no_wait {
        println!(
            "{}",
            format!("  Check progress with: lumen wait {}", job.id).dimmed()
        );
        return Ok(());
    }

    wait_with_progress(&client, &job.id, config).await
}

/// Show the current status of one job
pub async fn show_status(job_id: &str, config: &Config) -> Result<()> {
    let status = config
        .client()
        .get_status(job_id)
        .await
        .with_context(|| format!("Failed to fetch status for job {}", job_id))?;

    print_status(job_id, &status);

    Ok(())
}

/// Wait for an existing job
pub async fn wait(job_id: &str, config: &Config) -> Result<()> {
    let client = config.client();
    wait_with_progress(&client, job_id, config).await
}

/// List previous generations
pub async fn list_history(config: &Config) -> Result<()> {
    let records = config
        .client()
        .list_generations()
        .await
        .context("Failed to fetch generation history")?;

    if records.is_empty() {
        println!("{}", "No generations found.".yellow());
    } else {
        println!("{}", format!("Found {} generation(s):", records.len()).bold());
        println!();
        for record in &records {
            print_record(record);
        }
    }

    Ok(())
}

/// Polls `job_id` until it finishes, redrawing a progress line on stderr
///
/// Ctrl-C cancels the wait without touching the job itself.
async fn wait_with_progress(client: &ApiClient, job_id: &str, config: &Config) -> Result<()> {
    let poll_config = config.poll_config();
    let poller = JobPoller::new(client, poll_config);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    info!(
        job_id,
        interval_ms = poll_config.interval.as_millis() as u64,
        max_attempts = poll_config.max_attempts,
        "Waiting for job"
    );

    let started = Instant::now();
    let max_attempts = poll_config.max_attempts;
    let mut on_progress = |status: &JobStatus, attempt: u32| {
        eprint!(
            "\r{} {:<12} check {}/{} · {}s   ",
            "…".dimmed(),
            colorize_state(&status.state),
            attempt,
            max_attempts,
            started.elapsed().as_secs()
        );
        let _ = std::io::stderr().flush();
    };

    let outcome = poller
        .wait_for_completion_with_cancel(job_id, Some(&mut on_progress), &cancel)
        .await;

    signal_task.abort();
    eprintln!();

    match outcome {
        Ok(status) => {
            debug!(job_id, elapsed_ms = started.elapsed().as_millis() as u64, "Job completed");
            print_status(job_id, &status);
            Ok(())
        }
        Err(err) => {
            print_poll_hint(job_id, &err);
            Err(anyhow::Error::new(err).context(format!("Job {} did not complete", job_id)))
        }
    }
}

/// Tells the user what to do next, depending on why the wait ended
fn print_poll_hint(job_id: &str, err: &PollError<ClientError>) {
    match err {
        PollError::JobFailed { message } => {
            eprintln!("{} Job {} failed: {}", "✗".red(), job_id, message.red());
        }
        PollError::Timeout { attempts } => {
            eprintln!(
                "{} Gave up after {} checks; the job may still complete.",
                "⚠".yellow(),
                attempts
            );
            eprintln!("{}", format!("  Re-check later with: lumen wait {}", job_id).dimmed());
        }
        PollError::Cancelled { .. } => {
            eprintln!("{} Stopped waiting; the job keeps running.", "⚠".yellow());
        }
        PollError::Transport(e) if e.is_not_found() => {
            eprintln!("{} No job with id {}", "✗".red(), job_id);
        }
        PollError::Transport(_) => {
            eprintln!(
                "{} Could not reach the API; check connectivity and retry.",
                "✗".red()
            );
        }
    }
}

fn print_status(job_id: &str, status: &JobStatus) {
    println!("{}", "Job Status:".bold());
    println!("  ID:     {}", job_id.cyan());
    println!("  Status: {}", colorize_state(&status.state));

    if let Some(url) = &status.result_url {
        println!("  Image:  {}", url.underline());
    }

    if let Some(error) = &status.error_message {
        println!("  Error:  {}", error.red());
    }
}

fn print_record(record: &GenerationRecord) {
    println!("  {} Job {}", "▸".cyan(), record.id.dimmed());
    println!("    Prompt:  {}", record.prompt);
    println!("    Status:  {}", colorize_state(&record.status));
    println!(
        "    Created: {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(url) = &record.image_url {
        println!("    Image:   {}", url);
    }
    println!();
}

/// Colorize job state for display
fn colorize_state(state: &JobState) -> ColoredString {
    let label = state.as_str();
    match state {
        JobState::Pending => label.yellow(),
        JobState::Completed => label.green(),
        JobState::Failed => label.red(),
        JobState::Other(_) => label.cyan(),
    }
}
