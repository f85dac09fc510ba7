//! Generation history types

use serde::{Deserialize, Serialize};

use crate::domain::job::JobState;

/// A past generation as listed by the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: String,
    pub prompt: String,
    pub status: JobState,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
