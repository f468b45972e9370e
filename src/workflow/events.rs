// src/workflow/events.rs
//! Stage-transition events emitted while a run progresses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Scenes,
    Credentials,
    StoryboardSubmit,
    StoryboardPoll,
    RenderSubmit,
    RenderPoll,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    pub run_id: String,
    pub stage: Stage,
    pub status: StageStatus,
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl StageEvent {
    pub fn new(run_id: impl Into<String>, stage: Stage, status: StageStatus) -> Self {
        Self {
            run_id: run_id.into(),
            stage,
            status,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Optional subscriber for stage events. A dropped receiver never affects the run.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<mpsc::UnboundedSender<StageEvent>>,
}

impl EventSink {
    pub fn none() -> Self {
        Self { sender: None }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    pub fn emit(&self, event: StageEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        tracing::debug!(stage = ?event.stage, status = ?event.status, "stage event");
        if sender.send(event).is_err() {
            tracing::debug!("stage event receiver dropped");
        }
    }
}
