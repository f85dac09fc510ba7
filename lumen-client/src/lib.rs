//! Lumen HTTP Client
//!
//! A type-safe client for the Lumen image-generation API, plus the job
//! poller used to wait for a generation to finish.
//!
//! # Example
//!
//! ```no_run
//! use lumen_client::{ApiClient, PollConfig};
//! use lumen_core::dto::generation::GenerationRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8080");
//!
//!     let status = client
//!         .generate_and_wait(
//!             &GenerationRequest::new("a lighthouse at dusk"),
//!             PollConfig::default(),
//!             None,
//!         )
//!         .await?;
//!
//!     println!("Image ready at {:?}", status.result_url);
//!     Ok(())
//! }
//! ```

mod billing;
pub mod error;
mod generations;
pub mod poller;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{JobPoller, PollConfig, PollError, ProgressFn, StatusSource};

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the Lumen generation API
///
/// Methods are grouped by API area:
/// - Generation (submit, status, history)
/// - Billing (credit balance, transactions)
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API (e.g., "http://localhost:8080")
    base_url: String,
    /// Bearer token sent with every request, if set
    api_key: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Example
    /// ```
    /// use lumen_client::ApiClient;
    ///
    /// let client = ApiClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use lumen_client::ApiClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ApiClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        }
    }

    /// Attach an API key, sent as a bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        Ok(self.authorize(self.client.get(url)))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        Ok(self.authorize(self.client.post(url)))
    }

    /// Appends `segments` to the base URL, percent-encoding each one
    ///
    /// A segment may contain `/`, `?` or `#`; it still addresses a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                let message = format!("base URL {} cannot have a path", self.base_url);
                ClientError::InvalidRequest(message)
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::ApiError`] carrying the body text.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
