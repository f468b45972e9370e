// src/workflow/orchestrator.rs
//! End-to-end run: validate -> (scenes || credentials) -> storyboard -> poll -> render -> poll

use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::credentials::obtain_access_token;
use super::events::{EventSink, Stage, StageEvent, StageStatus};
use super::poller::poll_job;
use super::render::trigger_render;
use super::scenes::synthesize_scenes;
use super::storyboard::{submit_storyboard, StoryboardSettings};
use crate::config::{PollingConfig, DEFAULT_SCENE_COUNT};
use crate::error::OrchestrationError;
use crate::models::job::{JobKind, JobOutput};
use crate::models::scene::Scenario;
use crate::models::video::OrchestrationResult;
use crate::providers::{RenderProvider, TextGenerator};

/// Stateless across runs; one instance is shared by every request.
pub struct Orchestrator {
    text: Arc<dyn TextGenerator>,
    render: Arc<dyn RenderProvider>,
    scene_count: usize,
    storyboard: StoryboardSettings,
    polling: PollingConfig,
}

/// Per-run bookkeeping
struct RunContext<'a> {
    run_id: String,
    events: &'a EventSink,
    cancel: &'a CancellationToken,
}

impl RunContext<'_> {
    fn emit(&self, stage: Stage, status: StageStatus, details: Option<Value>) {
        let mut event = StageEvent::new(self.run_id.clone(), stage, status);
        if let Some(details) = details {
            event = event.with_details(details);
        }
        self.events.emit(event);
    }

    /// Runs one stage, aborting at cancellation and reporting start/end events
    async fn stage<T, F, D>(&self, stage: Stage, work: F, describe: D) -> Result<T, OrchestrationError>
    where
        F: Future<Output = Result<T, OrchestrationError>>,
        D: FnOnce(&T) -> Value,
    {
        self.emit(stage, StageStatus::Started, None);

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OrchestrationError::Cancelled),
            result = work => result,
        };

        match &result {
            Ok(value) => self.emit(stage, StageStatus::Completed, Some(describe(value))),
            Err(e) => self.emit(
                stage,
                StageStatus::Failed,
                Some(json!({ "code": e.code(), "error": e.to_string() })),
            ),
        }
        result
    }
}

impl Orchestrator {
    pub fn new(text: Arc<dyn TextGenerator>, render: Arc<dyn RenderProvider>) -> Self {
        Self {
            text,
            render,
            scene_count: DEFAULT_SCENE_COUNT,
            storyboard: StoryboardSettings::default(),
            polling: PollingConfig::default(),
        }
    }

    pub fn with_scene_count(mut self, scene_count: usize) -> Self {
        self.scene_count = scene_count.max(1);
        self
    }

    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Execute one run. Any stage failure ends the run; provider-side jobs are left as they are.
    pub async fn run(
        &self,
        scenario: Option<&str>,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("orchestration", run_id = %run_id);
        let ctx = RunContext {
            run_id,
            events,
            cancel,
        };

        let result = self.execute(&ctx, scenario).instrument(span.clone()).await;

        span.in_scope(|| match &result {
            Ok(done) => {
                tracing::info!(job_id = %done.job_id, video_url = %done.video_url, "Video ready");
                ctx.emit(
                    Stage::Done,
                    StageStatus::Completed,
                    Some(json!({ "jobId": done.job_id, "videoUrl": done.video_url })),
                );
            }
            Err(e) => {
                tracing::error!(code = e.code(), "Video generation failed: {}", e);
                ctx.emit(
                    Stage::Done,
                    StageStatus::Failed,
                    Some(json!({ "code": e.code(), "error": e.to_string() })),
                );
            }
        });
        result
    }

    async fn execute(
        &self,
        ctx: &RunContext<'_>,
        scenario: Option<&str>,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let scenario = ctx
            .stage(Stage::Validate, async { Scenario::parse(scenario) }, |_| json!({}))
            .await?;

        // No ordering between these two; either failing drops the other
        let (scenes, token) = tokio::try_join!(
            ctx.stage(
                Stage::Scenes,
                synthesize_scenes(self.text.as_ref(), &scenario, self.scene_count),
                |scenes| json!({ "count": scenes.len() }),
            ),
            ctx.stage(
                Stage::Credentials,
                obtain_access_token(self.render.as_ref()),
                |_| json!({}),
            ),
        )?;

        let storyboard = ctx
            .stage(
                Stage::StoryboardSubmit,
                submit_storyboard(self.render.as_ref(), &token, &scenes, &self.storyboard),
                |handle| json!({ "jobId": handle.id }),
            )
            .await?;

        ctx.stage(
            Stage::StoryboardPoll,
            poll_job(
                self.render.as_ref(),
                &token,
                &storyboard,
                &self.polling.storyboard,
                ctx.cancel,
            ),
            |_| json!({ "jobId": storyboard.id }),
        )
        .await?;

        let render = ctx
            .stage(
                Stage::RenderSubmit,
                trigger_render(self.render.as_ref(), &token, &storyboard.id),
                |handle| json!({ "jobId": handle.id }),
            )
            .await?;

        let output = ctx
            .stage(
                Stage::RenderPoll,
                poll_job(
                    self.render.as_ref(),
                    &token,
                    &render,
                    &self.polling.render,
                    ctx.cancel,
                ),
                |_| json!({ "jobId": render.id }),
            )
            .await?;

        let video_url = match output {
            JobOutput::Video { url } => url,
            JobOutput::RenderParams(_) => {
                return Err(OrchestrationError::job(
                    JobKind::Render,
                    render.id,
                    "render job returned storyboard output",
                ))
            }
        };

        Ok(OrchestrationResult {
            video_url,
            scenes,
            job_id: render.id,
        })
    }
}
