//! Generation API endpoints

use async_trait::async_trait;
use lumen_core::domain::generation::GenerationRecord;
use lumen_core::domain::job::JobStatus;
use lumen_core::dto::generation::{GenerationJob, GenerationRequest};
use tracing::info;

use crate::ApiClient;
use crate::error::{ClientError, Result};
use crate::poller::{JobPoller, PollConfig, PollError, ProgressFn, StatusSource};

impl ApiClient {
    // =============================================================================
    // Generation Lifecycle
    // =============================================================================

    /// Submit a new image generation
    ///
    /// The request is validated locally first; an invalid request never
    /// reaches the API.
    ///
    /// # Example
    /// ```no_run
    /// # use lumen_client::ApiClient;
    /// # use lumen_core::dto::generation::GenerationRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ApiClient::new("http://localhost:8080");
    /// let job = client
    ///     .submit_generation(&GenerationRequest::new("a red fox in snow"))
    ///     .await?;
    /// println!("queued {}", job.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_generation(&self, req: &GenerationRequest) -> Result<GenerationJob> {
        req.validate()?;

        let response = self.post(&["api", "generate"])?.json(req).send().await?;
        let job: GenerationJob = self.handle_response(response).await?;

        info!(job_id = %job.id, "Generation submitted");
        Ok(job)
    }

    /// Get the current status of a generation job
    pub async fn get_status(&self, job_id: &str) -> Result<JobStatus> {
        if job_id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id cannot be empty".to_string(),
            ));
        }

        let response = self
            .get(&["api", "generate", job_id, "status"])?
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List previous generations for the account, newest first
    pub async fn list_generations(&self) -> Result<Vec<GenerationRecord>> {
        let response = self.get(&["api", "generate", "history"])?.send().await?;

        self.handle_response(response).await
    }

    /// Submit a generation and wait for it to finish
    ///
    /// Submission failures surface as [`PollError::Transport`], like any
    /// other failed API call during the wait.
    pub async fn generate_and_wait(
        &self,
        req: &GenerationRequest,
        config: PollConfig,
        on_progress: Option<&mut ProgressFn<'_>>,
    ) -> std::result::Result<JobStatus, PollError<ClientError>> {
        let job = self
            .submit_generation(req)
            .await
            .map_err(PollError::Transport)?;

        JobPoller::new(self, config)
            .wait_for_completion(&job.id, on_progress)
            .await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    type Error = ClientError;

    async fn check_status(&self, job_id: &str) -> Result<JobStatus> {
        self.get_status(job_id).await
    }
}
