//! Billing domain types

use serde::{Deserialize, Serialize};

/// Remaining generation credits for the authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub credits: i64,
    #[serde(default)]
    pub plan: Option<String>,
}

/// Kind of credit movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Usage,
    Refund,
    Bonus,
}

/// A single credit ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Signed credit delta (negative for usage)
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
