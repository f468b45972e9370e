// src/providers.rs
//! Seams between the workflow and the two external providers.
//! The HTTP clients implement these; tests swap in in-memory fakes.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::job::{AccessToken, JobEnvelope, TokenResponse};
use crate::models::storyboard::{RenderRequest, StoryboardRequest};

/// Text-generation provider used to write the scene script
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a single user prompt and return the raw reply text
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Video-rendering provider with an asynchronous job API
#[async_trait]
pub trait RenderProvider: Send + Sync {
    async fn fetch_access_token(&self) -> Result<TokenResponse, ProviderError>;

    async fn create_storyboard(
        &self,
        token: &AccessToken,
        request: &StoryboardRequest,
    ) -> Result<JobEnvelope, ProviderError>;

    /// Keyed by the storyboard job id, not a render job id
    async fn render_storyboard(
        &self,
        token: &AccessToken,
        storyboard_job_id: &str,
        request: &RenderRequest,
    ) -> Result<JobEnvelope, ProviderError>;

    /// Shared status endpoint for both job kinds
    async fn get_job(&self, token: &AccessToken, job_id: &str) -> Result<JobEnvelope, ProviderError>;
}
