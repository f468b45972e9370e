// In-memory provider fakes shared by workflow and handler tests
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ProviderError;
use crate::models::job::{AccessToken, JobData, JobEnvelope, TokenResponse};
use crate::models::storyboard::{RenderRequest, StoryboardRequest};
use crate::providers::{RenderProvider, TextGenerator};

pub(crate) const VIDEO_URL: &str = "https://cdn.example.com/videos/r-1.mp4";

fn status_error(status: u16) -> ProviderError {
    ProviderError::Status {
        status,
        body: "fake provider failure".to_string(),
    }
}

pub(crate) enum Reply {
    Fixed(String),
    /// Echo the scenario line of the prompt back as a single narrated scene
    EchoScenario,
    Fail(u16),
}

pub(crate) struct FakeTextGenerator {
    reply: Reply,
    pub calls: AtomicUsize,
}

impl FakeTextGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Fixed(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn echoing() -> Self {
        Self {
            reply: Reply::EchoScenario,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Reply::Fail(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::EchoScenario => {
                let scenario = prompt
                    .lines()
                    .rev()
                    .find_map(|line| line.strip_prefix("Scenario: "))
                    .unwrap_or_default();
                Ok(json!([{ "text": scenario, "voiceOver": true }]).to_string())
            }
            Reply::Fail(status) => Err(status_error(*status)),
        }
    }
}

type Scripted = Result<Option<String>, u16>;

pub(crate) struct FakeRenderProvider {
    token: Scripted,
    storyboard_job: Scripted,
    render_job: Scripted,
    statuses: Mutex<HashMap<String, VecDeque<Result<Value, u16>>>>,
    pub token_calls: AtomicUsize,
    pub storyboard_calls: AtomicUsize,
    pub render_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub last_storyboard: Mutex<Option<StoryboardRequest>>,
    pub rendered_storyboards: Mutex<Vec<String>>,
}

impl FakeRenderProvider {
    /// Token `tok`, storyboard `sb-1` ready on the second poll, render `r-1` completed on the second poll
    pub fn happy() -> Self {
        Self {
            token: Ok(Some("tok".to_string())),
            storyboard_job: Ok(Some("sb-1".to_string())),
            render_job: Ok(Some("r-1".to_string())),
            statuses: Mutex::new(HashMap::new()),
            token_calls: AtomicUsize::new(0),
            storyboard_calls: AtomicUsize::new(0),
            render_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_storyboard: Mutex::new(None),
            rendered_storyboards: Mutex::new(Vec::new()),
        }
        .with_statuses("sb-1", vec![Ok(json!({})), Ok(json!({"renderParams": {"output": "mp4"}}))])
        .with_statuses(
            "r-1",
            vec![
                Ok(json!({"status": "in-progress"})),
                Ok(json!({"status": "completed", "videoURL": VIDEO_URL})),
            ],
        )
    }

    pub fn with_token(mut self, token: Scripted) -> Self {
        self.token = token;
        self
    }

    pub fn with_storyboard_job(mut self, job: Scripted) -> Self {
        self.storyboard_job = job;
        self
    }

    pub fn with_render_job(mut self, job: Scripted) -> Self {
        self.render_job = job;
        self
    }

    /// Status payloads returned in order; the last one repeats forever
    pub fn with_statuses(self, job_id: &str, statuses: Vec<Result<Value, u16>>) -> Self {
        if let Ok(mut map) = self.statuses.lock() {
            map.insert(job_id.to_string(), statuses.into());
        }
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn job_envelope(job: &Scripted) -> Result<JobEnvelope, ProviderError> {
        match job {
            Ok(id) => Ok(JobEnvelope {
                data: JobData {
                    job_id: id.clone(),
                    ..Default::default()
                },
            }),
            Err(status) => Err(status_error(*status)),
        }
    }
}

#[async_trait]
impl RenderProvider for FakeRenderProvider {
    async fn fetch_access_token(&self) -> Result<TokenResponse, ProviderError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match &self.token {
            Ok(token) => Ok(TokenResponse {
                access_token: token.clone(),
            }),
            Err(status) => Err(status_error(*status)),
        }
    }

    async fn create_storyboard(
        &self,
        _token: &AccessToken,
        request: &StoryboardRequest,
    ) -> Result<JobEnvelope, ProviderError> {
        self.storyboard_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_storyboard.lock().unwrap() = Some(request.clone());
        Self::job_envelope(&self.storyboard_job)
    }

    async fn render_storyboard(
        &self,
        _token: &AccessToken,
        storyboard_job_id: &str,
        _request: &RenderRequest,
    ) -> Result<JobEnvelope, ProviderError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        self.rendered_storyboards
            .lock()
            .unwrap()
            .push(storyboard_job_id.to_string());
        Self::job_envelope(&self.render_job)
    }

    async fn get_job(&self, _token: &AccessToken, job_id: &str) -> Result<JobEnvelope, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut statuses = self.statuses.lock().unwrap();
            match statuses.get_mut(job_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match next {
            Some(Ok(data)) => Ok(JobEnvelope {
                data: serde_json::from_value(data)?,
            }),
            Some(Err(status)) => Err(status_error(status)),
            None => Ok(JobEnvelope::default()),
        }
    }
}
