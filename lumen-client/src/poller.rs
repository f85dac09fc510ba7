//! Job poller
//!
//! Waits for a generation job to reach a terminal state by checking its
//! status on a fixed interval. A session performs at most
//! [`PollConfig::max_attempts`] checks, strictly one after another, and ends
//! with exactly one outcome: the completed [`JobStatus`] or a [`PollError`].
//!
//! The status check itself is abstracted behind [`StatusSource`], so the
//! poller works the same against the HTTP API ([`crate::ApiClient`]) or any
//! in-process source.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lumen_core::domain::job::{JobState, JobStatus};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay between two status checks unless configured otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Number of status checks before giving up unless configured otherwise
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Message used when a job fails without saying why
pub const DEFAULT_FAILURE_MESSAGE: &str = "job failed";

/// Progress callback, invoked with every observed status and its 1-based attempt number
pub type ProgressFn<'a> = dyn FnMut(&JobStatus, u32) + Send + 'a;

/// Something that can report the current status of a job
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Error raised when the status cannot be obtained
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the current status of `job_id`
    async fn check_status(&self, job_id: &str) -> Result<JobStatus, Self::Error>;
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for &T {
    type Error = T::Error;

    async fn check_status(&self, job_id: &str) -> Result<JobStatus, Self::Error> {
        (**self).check_status(job_id).await
    }
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    type Error = T::Error;

    async fn check_status(&self, job_id: &str) -> Result<JobStatus, Self::Error> {
        (**self).check_status(job_id).await
    }
}

/// How a poll session ended without a completed job
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The status check itself failed; the source's error is kept unchanged
    #[error("status check failed: {0}")]
    Transport(#[source] E),

    /// The job reached the `failed` state
    #[error("{message}")]
    JobFailed { message: String },

    /// The attempt budget ran out while the job was still in progress
    #[error("job still in progress after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The caller cancelled the wait
    #[error("wait cancelled after {attempts} status checks")]
    Cancelled { attempts: u32 },
}

impl<E> PollError<E> {
    fn job_failed(message: Option<String>) -> Self {
        Self::JobFailed {
            message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        }
    }

    /// The job may still finish later; re-check or re-submit
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The job itself failed
    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::JobFailed { .. })
    }

    /// The status could not be fetched
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the source's error if this is a transport failure
    pub fn into_transport(self) -> Option<E> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Rejected poll configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollConfigError {
    #[error("max_attempts must be greater than 0")]
    ZeroAttempts,
}

/// Poll session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed delay between two status checks
    pub interval: Duration,

    /// Maximum number of status checks in one session
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), PollConfigError> {
        if self.max_attempts == 0 {
            return Err(PollConfigError::ZeroAttempts);
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}

/// Waits for jobs to finish by polling a [`StatusSource`]
///
/// Each call to [`wait_for_completion`](Self::wait_for_completion) is an
/// independent session; the poller holds no per-job state.
#[derive(Debug, Clone)]
pub struct JobPoller<S> {
    source: S,
    config: PollConfig,
}

impl<S: StatusSource> JobPoller<S> {
    /// Creates a poller over `source`
    pub fn new(source: S, config: PollConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Polls `job_id` until it completes, fails, or the attempt budget runs out
    ///
    /// `on_progress` sees every status, terminal or not, before the poller
    /// decides what to do with it. A panic inside the callback is caught and
    /// logged; polling carries on.
    ///
    /// # Errors
    /// - [`PollError::Transport`] as soon as a status check fails (no retry)
    /// - [`PollError::JobFailed`] when the job reports `failed`
    /// - [`PollError::Timeout`] after `max_attempts` non-terminal checks
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        on_progress: Option<&mut ProgressFn<'_>>,
    ) -> Result<JobStatus, PollError<S::Error>> {
        self.run(job_id, on_progress, None).await
    }

    /// Same as [`wait_for_completion`](Self::wait_for_completion), but gives
    /// up with [`PollError::Cancelled`] once `cancel` fires, whether a check
    /// is in flight or the poller is sleeping.
    pub async fn wait_for_completion_with_cancel(
        &self,
        job_id: &str,
        on_progress: Option<&mut ProgressFn<'_>>,
        cancel: &CancellationToken,
    ) -> Result<JobStatus, PollError<S::Error>> {
        self.run(job_id, on_progress, Some(cancel)).await
    }

    async fn run(
        &self,
        job_id: &str,
        mut on_progress: Option<&mut ProgressFn<'_>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<JobStatus, PollError<S::Error>> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let checked = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(job_id, attempt, "Wait cancelled during status check");
                        return Err(PollError::Cancelled { attempts: attempt - 1 });
                    }
                    result = self.source.check_status(job_id) => result,
                },
                None => self.source.check_status(job_id).await,
            };

            let status = checked.map_err(PollError::Transport)?;

            debug!(
                job_id,
                attempt,
                max_attempts = self.config.max_attempts,
                state = %status.state,
                "Checked job status"
            );

            if let Some(callback) = on_progress.as_deref_mut() {
                report_progress(callback, &status, attempt);
            }

            match status.state {
                JobState::Completed => return Ok(status),
                JobState::Failed => return Err(PollError::job_failed(status.error_message)),
                _ => {}
            }

            if attempt >= self.config.max_attempts {
                return Err(PollError::Timeout { attempts: attempt });
            }

            match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(job_id, attempt, "Wait cancelled between status checks");
                        return Err(PollError::Cancelled { attempts: attempt });
                    }
                    _ = tokio::time::sleep(self.config.interval) => {}
                },
                None => tokio::time::sleep(self.config.interval).await,
            }
        }
    }
}

fn report_progress(callback: &mut ProgressFn<'_>, status: &JobStatus, attempt: u32) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(status, attempt)));
    if outcome.is_err() {
        warn!(attempt, "Progress callback panicked, continuing to poll");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    #[error("connection reset ({0})")]
    struct StubError(&'static str);

    /// Replays scripted responses, then keeps answering with `fallback`
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<JobStatus, StubError>>>,
        fallback: JobStatus,
        calls: AtomicU32,
        in_flight: AtomicBool,
        check_delay: Option<Duration>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<JobStatus, StubError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: JobStatus::pending(),
                calls: AtomicU32::new(0),
                in_flight: AtomicBool::new(false),
                check_delay: None,
            }
        }

        fn always_pending() -> Self {
            Self::new(Vec::new())
        }

        fn with_check_delay(mut self, delay: Duration) -> Self {
            self.check_delay = Some(delay);
            self
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        type Error = StubError;

        async fn check_status(&self, _job_id: &str) -> Result<JobStatus, StubError> {
            assert!(
                !self.in_flight.swap(true, Ordering::SeqCst),
                "status checks overlapped"
            );
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.check_delay {
                tokio::time::sleep(delay).await;
            }

            let next = self.script.lock().unwrap().pop_front();
            self.in_flight.store(false, Ordering::SeqCst);
            next.unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig::new(Duration::from_millis(1), max_attempts)
    }

    #[test]
    fn test_default_config() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_millis(3000));
        assert_eq!(config.max_attempts, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = PollConfig::default().with_max_attempts(0);
        assert_eq!(config.validate(), Err(PollConfigError::ZeroAttempts));
    }

    #[tokio::test]
    async fn test_completes_on_first_check() {
        let source = ScriptedSource::new(vec![Ok(JobStatus::completed("https://cdn/a.png"))]);
        let poller = JobPoller::new(&source, fast_config(60));
        let mut seen = Vec::new();

        let status = poller
            .wait_for_completion("job-1", Some(&mut |s: &JobStatus, attempt: u32| {
                seen.push((s.state.clone(), attempt))
            }))
            .await
            .unwrap();

        assert_eq!(status.result_url.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(source.calls(), 1);
        assert_eq!(seen, vec![(JobState::Completed, 1)]);
    }

    #[tokio::test]
    async fn test_failed_job_carries_backend_message() {
        let source = ScriptedSource::new(vec![Ok(JobStatus::failed(Some("boom".to_string())))]);
        let poller = JobPoller::new(&source, fast_config(60));

        let err = poller.wait_for_completion("job-1", None).await.unwrap_err();

        assert!(err.is_job_failure());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_without_message_uses_fallback() {
        let source = ScriptedSource::new(vec![Ok(JobStatus::failed(None))]);
        let poller = JobPoller::new(&source, fast_config(60));

        let err = poller.wait_for_completion("job-1", None).await.unwrap_err();

        match err {
            PollError::JobFailed { message } => {
                assert!(!message.is_empty());
                assert_eq!(message, DEFAULT_FAILURE_MESSAGE);
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_times_out_after_exactly_max_attempts() {
        let source = ScriptedSource::always_pending();
        let poller = JobPoller::new(&source, fast_config(3));

        let err = poller.wait_for_completion("job-1", None).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(err, PollError::Timeout { attempts: 3 }));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_progress_reported_in_attempt_order() {
        let source = ScriptedSource::new(vec![
            Ok(JobStatus::pending()),
            Ok(JobStatus::pending()),
            Ok(JobStatus::completed("https://cdn/third.png")),
        ]);
        let poller = JobPoller::new(&source, fast_config(10));
        let mut attempts = Vec::new();

        let status = poller
            .wait_for_completion("job-1", Some(&mut |_: &JobStatus, attempt: u32| {
                attempts.push(attempt)
            }))
            .await
            .unwrap();

        assert_eq!(attempts, vec![1, 2, 3]);
        assert_eq!(status.result_url.as_deref(), Some("https://cdn/third.png"));
    }

    #[tokio::test]
    async fn test_transport_error_ends_session() {
        let source = ScriptedSource::new(vec![
            Ok(JobStatus::pending()),
            Err(StubError("reset")),
            Ok(JobStatus::completed("https://cdn/never.png")),
        ]);
        let poller = JobPoller::new(&source, fast_config(10));
        let mut progress_calls = 0;

        let err = poller
            .wait_for_completion("job-1", Some(&mut |_: &JobStatus, _: u32| progress_calls += 1))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err.into_transport(), Some(StubError("reset")));
        assert_eq!(source.calls(), 2);
        assert_eq!(progress_calls, 1);
    }

    #[tokio::test]
    async fn test_checks_never_overlap() {
        let source = ScriptedSource::new(vec![
            Ok(JobStatus::pending()),
            Ok(JobStatus::pending()),
            Ok(JobStatus::pending()),
            Ok(JobStatus::completed("https://cdn/x.png")),
        ])
        .with_check_delay(Duration::from_millis(5));
        let poller = JobPoller::new(&source, fast_config(10));

        poller.wait_for_completion("job-1", None).await.unwrap();

        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_unknown_state_keeps_polling() {
        let source = ScriptedSource::new(vec![
            Ok(JobStatus {
                state: JobState::from("upscaling"),
                result_url: None,
                error_message: None,
            }),
            Ok(JobStatus::completed("https://cdn/x.png")),
        ]);
        let poller = JobPoller::new(&source, fast_config(10));

        poller.wait_for_completion("job-1", None).await.unwrap();

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_abort_polling() {
        let source = ScriptedSource::new(vec![
            Ok(JobStatus::pending()),
            Ok(JobStatus::completed("https://cdn/x.png")),
        ]);
        let poller = JobPoller::new(&source, fast_config(10));

        let status = poller
            .wait_for_completion("job-1", Some(&mut |_: &JobStatus, attempt: u32| {
                if attempt == 1 {
                    panic!("progress bar exploded");
                }
            }))
            .await
            .unwrap();

        assert_eq!(status.state, JobState::Completed);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancel_while_sleeping_stops_checks() {
        let source = Arc::new(ScriptedSource::always_pending());
        let poller = JobPoller::new(Arc::clone(&source), PollConfig::default());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = poller
            .wait_for_completion_with_cancel("job-1", None, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { attempts: 1 }));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_check_counts_completed_checks() {
        let source = Arc::new(
            ScriptedSource::always_pending().with_check_delay(Duration::from_millis(100)),
        );
        let poller = JobPoller::new(Arc::clone(&source), fast_config(10));
        let cancel = CancellationToken::new();

        // First check ends at ~100ms, the second is still in flight at 150ms.
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.cancel();
        });

        let mut seen = Vec::new();
        let err = poller
            .wait_for_completion_with_cancel(
                "job-1",
                Some(&mut |_: &JobStatus, attempt: u32| seen.push(attempt)),
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { attempts: 1 }));
        assert_eq!(source.calls(), 2);
        assert_eq!(seen, vec![1]);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_checks() {
        let source = ScriptedSource::always_pending();
        let poller = JobPoller::new(&source, fast_config(10));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller
            .wait_for_completion_with_cancel("job-1", None, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(source.calls(), 0);
    }
}
