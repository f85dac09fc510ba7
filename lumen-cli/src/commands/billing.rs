//! Billing command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use lumen_core::domain::billing::{Transaction, TransactionKind};

use crate::config::Config;

/// Billing subcommands
#[derive(Subcommand)]
pub enum BillingCommands {
    /// Show remaining credits
    Balance,
    /// List credit transactions
    Transactions,
}

/// Handle billing commands
pub async fn handle_billing_command(command: BillingCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BillingCommands::Balance => {
            let balance = client
                .get_balance()
                .await
                .context("Failed to fetch credit balance")?;

            println!("{}", "Credit Balance:".bold());
            println!("  Credits: {}", balance.credits.to_string().cyan());
            if let Some(plan) = &balance.plan {
                println!("  Plan:    {}", plan);
            }
        }
        BillingCommands::Transactions => {
            let transactions = client
                .list_transactions()
                .await
                .context("Failed to fetch transactions")?;

            if transactions.is_empty() {
                println!("{}", "No transactions found.".yellow());
            } else {
                println!(
                    "{}",
                    format!("Found {} transaction(s):", transactions.len()).bold()
                );
                println!();
                for tx in &transactions {
                    print_transaction(tx);
                }
            }
        }
    }

    Ok(())
}

fn print_transaction(tx: &Transaction) {
    let amount = format!("{:+}", tx.amount);
    let amount = if tx.amount < 0 { amount.red() } else { amount.green() };

    println!(
        "  {} {} {:>8}  {}  {}",
        "▸".cyan(),
        tx.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
        amount,
        kind_label(tx.kind),
        tx.description.as_deref().unwrap_or("").dimmed()
    );
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Purchase => "purchase",
        TransactionKind::Usage => "usage",
        TransactionKind::Refund => "refund",
        TransactionKind::Bonus => "bonus",
    }
}
