// src/models/job.rs
//! Render-provider job handles and the per-kind completion predicate

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Short-lived bearer credential for the render provider.
/// Fetched fresh for every run and never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep secrets out of logs
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Storyboard,
    Render,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Storyboard => f.write_str("storyboard"),
            JobKind::Render => f.write_str("render"),
        }
    }
}

/// Provider-assigned job id tagged with the schema its status payload follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
    pub kind: JobKind,
}

impl JobHandle {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self { id: id.into(), kind }
    }
}

/// Terminal payload of a successful job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    /// Storyboard finished; the provider's render parameters
    RenderParams(Value),
    /// Render finished; playable video location
    Video { url: String },
}

/// Client-side observation of a server-authoritative job state
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    InProgress { status: Option<String> },
    Completed(JobOutput),
    Failed { reason: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed { .. })
    }
}

/// `{ "access_token": ... }` from the token endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `{ "data": { ... } }` wrapper shared by every job endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobEnvelope {
    #[serde(default)]
    pub data: JobData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobData {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(rename = "renderParams", default)]
    pub render_params: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "videoURL", default)]
    pub video_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobData {
    fn status_is(&self, expected: &str) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }

    fn failure_reason(&self) -> String {
        let detail = self
            .extra
            .get("error")
            .or_else(|| self.extra.get("message"))
            .and_then(Value::as_str);
        match (self.status.as_deref(), detail) {
            (Some(status), Some(detail)) => format!("provider reported {}: {}", status, detail),
            (Some(status), None) => format!("provider reported {}", status),
            (None, Some(detail)) => detail.to_string(),
            (None, None) => "provider reported failure".to_string(),
        }
    }
}

impl JobKind {
    /// Maps a raw status payload to a job state for this kind.
    ///
    /// Storyboard jobs are done once `renderParams` is present. Render jobs
    /// are done on a `completed`/`failed` status; the provider's casing is
    /// inconsistent ("completed" vs "Failed") so both are matched without case.
    pub fn classify(self, data: &JobData) -> JobStatus {
        if data.status_is("failed") || data.status_is("error") {
            return JobStatus::Failed {
                reason: data.failure_reason(),
            };
        }

        match self {
            JobKind::Storyboard => match &data.render_params {
                Some(params) if !params.is_null() => {
                    JobStatus::Completed(JobOutput::RenderParams(params.clone()))
                }
                _ => Self::not_terminal(data),
            },
            JobKind::Render => {
                if !data.status_is("completed") {
                    return Self::not_terminal(data);
                }
                match data.video_url.as_deref().map(str::trim) {
                    Some(url) if Url::parse(url).is_ok() => JobStatus::Completed(JobOutput::Video {
                        url: url.to_string(),
                    }),
                    Some(url) => JobStatus::Failed {
                        reason: format!("completed with an invalid video URL: {:?}", url),
                    },
                    None => JobStatus::Failed {
                        reason: "completed without a video URL".to_string(),
                    },
                }
            }
        }
    }

    fn not_terminal(data: &JobData) -> JobStatus {
        if data.status.is_none() || data.status_is("pending") || data.status_is("queued") {
            JobStatus::Pending
        } else {
            JobStatus::InProgress {
                status: data.status.clone(),
            }
        }
    }
}
