//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by the status endpoint
///
/// Only `Completed` and `Failed` are terminal. Any label the backend adds
/// later is kept verbatim in `Other` and treated as still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl JobState {
    /// Whether no further transition can happen from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for JobState {
    fn from(label: String) -> Self {
        match label.as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for JobState {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Other(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a generation job as returned by the status endpoint
///
/// Wire format: `{ "status": "...", "imageUrl"?: "...", "errorMessage"?: "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(rename = "status")]
    pub state: JobState,

    /// Location of the generated image, set once the job completed
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    /// Backend-provided reason, set once the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JobStatus {
    pub fn pending() -> Self {
        Self {
            state: JobState::Pending,
            result_url: None,
            error_message: None,
        }
    }

    pub fn completed(result_url: impl Into<String>) -> Self {
        Self {
            state: JobState::Completed,
            result_url: Some(result_url.into()),
            error_message: None,
        }
    }

    pub fn failed(error_message: Option<String>) -> Self {
        Self {
            state: JobState::Failed,
            result_url: None,
            error_message,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
