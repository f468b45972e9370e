// src/models/video.rs
//! HTTP request/response bodies and the run result

use serde::{Deserialize, Serialize};

use super::scene::Scene;

/// Body of `POST /api/pictory/scenes`.
/// `scenario` is left loosely typed so a missing or non-string value is a validation failure, not a 422.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateVideoRequest {
    #[serde(default)]
    pub scenario: Option<serde_json::Value>,
}

impl GenerateVideoRequest {
    pub fn scenario_text(&self) -> Option<&str> {
        self.scenario.as_ref().and_then(|v| v.as_str())
    }
}

/// Successful outcome of one orchestration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub video_url: String,
    pub scenes: Vec<Scene>,
    /// Render job id
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
