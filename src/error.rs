// src/error.rs
//! Failure taxonomy for provider calls and orchestration runs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::models::job::JobKind;
use crate::models::video::ErrorResponse;

/// Errors raised by the provider HTTP clients
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Connection drops, timeouts, rate limiting and 5xx replies are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_connect() || e.is_timeout(),
            ProviderError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            ProviderError::Decode(_) | ProviderError::Malformed(_) => false,
        }
    }
}

/// Errors that terminate an orchestration run
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Scenario required")]
    Validation,
    #[error("Scene generation failed: {0}")]
    Generation(#[source] ProviderError),
    #[error("Authentication with render provider failed: {0}")]
    Auth(String),
    #[error("{kind} submission failed: {reason}")]
    Submission { kind: JobKind, reason: String },
    #[error("{kind} job {job_id} failed: {reason}")]
    Job {
        kind: JobKind,
        job_id: String,
        reason: String,
    },
    #[error("{kind} job {job_id} did not finish within {}s", elapsed.as_secs())]
    Timeout {
        kind: JobKind,
        job_id: String,
        elapsed: Duration,
    },
    #[error("Video generation cancelled")]
    Cancelled,
}

impl OrchestrationError {
    pub fn submission(kind: JobKind, reason: impl Into<String>) -> Self {
        Self::Submission {
            kind,
            reason: reason.into(),
        }
    }

    pub fn job(kind: JobKind, job_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Job {
            kind,
            job_id: job_id.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable name used in logs and stage events
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::Validation => "validation_failure",
            OrchestrationError::Generation(_) => "generation_failure",
            OrchestrationError::Auth(_) => "auth_failure",
            OrchestrationError::Submission { .. } => "submission_failure",
            OrchestrationError::Job { .. } => "job_failure",
            OrchestrationError::Timeout { .. } => "timeout",
            OrchestrationError::Cancelled => "cancelled",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            OrchestrationError::Validation => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OrchestrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
