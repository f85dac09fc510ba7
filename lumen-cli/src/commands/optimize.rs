//! Optimize command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use lumen_optimizer::{OptimizeConfig, OptimizeReport, Optimizer};

/// Arguments for `lumen optimize`
#[derive(Args)]
pub struct OptimizeArgs {
    /// Directory containing source images
    pub input: PathBuf,

    /// Directory receiving optimized images
    pub output: PathBuf,

    /// Responsive widths to generate
    #[arg(long, value_delimiter = ',', default_values_t = [320, 640, 1024, 1920])]
    pub widths: Vec<u32>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 80)]
    pub quality: u8,

    /// Skip WebP siblings
    #[arg(long)]
    pub no_webp: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&OptimizeArgs> for OptimizeConfig {
    fn from(args: &OptimizeArgs) -> Self {
        OptimizeConfig::new(&args.input, &args.output)
            .with_widths(args.widths.clone())
            .with_jpeg_quality(args.quality)
            .with_webp(!args.no_webp)
    }
}

/// Run the optimizer off the async runtime and print its report
pub async fn run(args: OptimizeArgs) -> Result<()> {
    let config = OptimizeConfig::from(&args);
    config.validate()?;

    let report = tokio::task::spawn_blocking(move || Optimizer::new(config).run())
        .await
        .context("Optimizer task panicked")?
        .context("Image optimization failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.files_failed() > 0 {
        anyhow::bail!("{} image(s) could not be optimized", report.files_failed());
    }

    Ok(())
}

fn print_report(report: &OptimizeReport) {
    if report.files_processed() == 0 && report.files_failed() == 0 {
        println!("{}", "No images found.".yellow());
        return;
    }

    for file in &report.files {
        println!(
            "  {} {} {} → {}",
            "✓".green(),
            file.source.display(),
            format_bytes(file.original_bytes).dimmed(),
            format_bytes(file.optimized_bytes)
        );
    }

    for failure in &report.failures {
        println!(
            "  {} {} {}",
            "✗".red(),
            failure.source.display(),
            failure.reason.red()
        );
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  Images:   {}", report.files_processed());
    println!("  Variants: {}", report.variants_written());
    println!(
        "  Size:     {} → {}",
        format_bytes(report.original_bytes()),
        format_bytes(report.optimized_bytes())
    );

    let savings = format!("{:.1}%", report.savings_percent());
    let savings = if report.savings_percent() >= 0.0 {
        savings.green()
    } else {
        savings.red()
    };
    println!("  Savings:  {}", savings);
}

/// Human-readable byte count
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
