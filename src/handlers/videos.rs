// src/handlers/videos.rs
//! Video generation endpoints - blocking JSON and streamed stage events

use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::post,
    Router,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::DropGuard;

use crate::error::OrchestrationError;
use crate::models::scene::Scenario;
use crate::models::video::{ErrorResponse, GenerateVideoRequest, OrchestrationResult};
use crate::workflow::{EventSink, StageEvent};
use crate::AppState;

pub fn video_routes() -> Router {
    Router::new()
        .route("/api/pictory/scenes", post(generate_video))
        .route("/api/pictory/scenes/stream", post(generate_video_stream))
}

// An unreadable body is treated the same as a missing scenario
fn scenario_text(body: &Option<Json<GenerateVideoRequest>>) -> Option<&str> {
    body.as_ref().and_then(|Json(request)| request.scenario_text())
}

/// POST /api/pictory/scenes - Run the whole pipeline and return the video URL
pub async fn generate_video(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<GenerateVideoRequest>>,
) -> Result<Json<OrchestrationResult>, OrchestrationError> {
    let cancel = state.shutdown.child_token();
    let result = state
        .orchestrator
        .run(scenario_text(&body), &EventSink::none(), &cancel)
        .await?;
    Ok(Json(result))
}

fn sse_event<T: Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

type RunHandle = JoinHandle<Result<OrchestrationResult, OrchestrationError>>;

struct StreamState {
    events: UnboundedReceiver<StageEvent>,
    run: RunHandle,
    // Dropping the stream (client went away) cancels the run
    cancel_on_drop: DropGuard,
}

async fn final_event(run: RunHandle) -> Event {
    match run.await {
        Ok(Ok(result)) => sse_event("result", &result),
        Ok(Err(e)) => sse_event("error", &ErrorResponse { error: e.to_string() }),
        Err(join_error) => {
            tracing::error!("Orchestration task aborted: {}", join_error);
            sse_event(
                "error",
                &ErrorResponse {
                    error: "Video generation aborted".to_string(),
                },
            )
        }
    }
}

/// POST /api/pictory/scenes/stream - Same pipeline, reporting each stage as an SSE event
pub async fn generate_video_stream(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<GenerateVideoRequest>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, OrchestrationError> {
    // Reject before opening the stream so a bad request is still a plain 400
    let scenario = Scenario::parse(scenario_text(&body))?;

    let cancel = state.shutdown.child_token();
    let cancel_on_drop = cancel.clone().drop_guard();
    let (sink, events) = EventSink::channel();
    let orchestrator = state.orchestrator.clone();

    let run = tokio::spawn(async move {
        orchestrator
            .run(Some(scenario.as_str()), &sink, &cancel)
            .await
    });

    let initial = Some(StreamState {
        events,
        run,
        cancel_on_drop,
    });

    let stream = stream::unfold(initial, |state| async move {
        let StreamState {
            mut events,
            run,
            cancel_on_drop,
        } = state?;

        match events.recv().await {
            Some(event) => {
                let next = StreamState {
                    events,
                    run,
                    cancel_on_drop,
                };
                Some((Ok::<_, Infallible>(sse_event("stage", &event)), Some(next)))
            }
            // Sender dropped: the run has returned
            None => {
                let last = final_event(run).await;
                let _ = cancel_on_drop.disarm();
                Some((Ok(last), None))
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
