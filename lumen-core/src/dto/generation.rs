//! Generation DTOs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::job::JobState;

/// Smallest edge length the generator accepts
pub const MIN_DIMENSION: u32 = 64;
/// Largest edge length the generator accepts
pub const MAX_DIMENSION: u32 = 2048;

/// Reasons a generation request is rejected before it is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("{field} must be between 64 and 2048, got {value}")]
    DimensionOutOfRange { field: &'static str, value: u32 },

    #[error("{field} must be a multiple of 8, got {value}")]
    DimensionNotAligned { field: &'static str, value: u32 },
}

/// Request to start a new image generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationRequest {
    /// Square 1024px request with no style or seed
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            width: 1024,
            height: 1024,
            style: None,
            seed: None,
        }
    }

    /// Checks the request against the generator's limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.trim().is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }

        for (field, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(ValidationError::DimensionOutOfRange { field, value });
            }
            if value % 8 != 0 {
                return Err(ValidationError::DimensionNotAligned { field, value });
            }
        }

        Ok(())
    }
}

/// Response to a submitted generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    /// Opaque job identifier used for status checks
    pub id: String,
    pub status: JobState,
}
