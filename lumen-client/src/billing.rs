//! Billing API endpoints

use lumen_core::domain::billing::{CreditBalance, Transaction};

use crate::ApiClient;
use crate::error::Result;

impl ApiClient {
    // =============================================================================
    // Billing
    // =============================================================================

    /// Get the remaining credit balance
    pub async fn get_balance(&self) -> Result<CreditBalance> {
        let response = self.get(&["api", "billing", "balance"])?.send().await?;

        self.handle_response(response).await
    }

    /// List credit transactions for the account
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let response = self.get(&["api", "billing", "transactions"])?.send().await?;

        self.handle_response(response).await
    }
}
