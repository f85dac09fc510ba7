//! Configuration module
//!
//! Settings shared by every command: where the API lives, how to
//! authenticate, and how long to wait for jobs.

use std::time::Duration;

use lumen_client::{ApiClient, PollConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the generation API
    pub api_url: String,

    /// API key sent as a bearer token
    pub api_key: Option<String>,

    /// Delay between two status checks while waiting
    pub poll_interval: Duration,

    /// Status checks before giving up on a job
    pub max_attempts: u32,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if matches!(&self.api_key, Some(key) if key.trim().is_empty()) {
            anyhow::bail!("api_key cannot be blank");
        }

        self.poll_config().validate()?;

        Ok(())
    }

    /// Builds an API client for this configuration
    pub fn client(&self) -> ApiClient {
        let client = ApiClient::new(&self.api_url);
        match &self.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.poll_interval, self.max_attempts)
    }
}
