// src/workflow/render.rs
//! Render Trigger: completed storyboard -> render job

use crate::error::OrchestrationError;
use crate::models::job::{AccessToken, JobHandle, JobKind};
use crate::models::storyboard::RenderRequest;
use crate::providers::RenderProvider;

/// The render endpoint is keyed by the storyboard job id itself.
pub async fn trigger_render(
    provider: &dyn RenderProvider,
    token: &AccessToken,
    storyboard_job_id: &str,
) -> Result<JobHandle, OrchestrationError> {
    let envelope = provider
        .render_storyboard(token, storyboard_job_id, &RenderRequest::default())
        .await
        .map_err(|e| OrchestrationError::submission(JobKind::Render, e.to_string()))?;

    let job_id = envelope
        .data
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| OrchestrationError::submission(JobKind::Render, "response did not include a job_id"))?;

    tracing::info!(job_id = %job_id, storyboard_job_id = %storyboard_job_id, "Render job created");
    Ok(JobHandle::new(job_id, JobKind::Render))
}
