// lib.rs - scenario-to-video orchestration service
use axum::{Extension, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openai_client;
pub mod pictory_client;
pub mod providers;
pub mod workflow;

/// Shared by every request. Runs are independent; nothing here is mutated per run.
pub struct AppState {
    pub orchestrator: Arc<workflow::Orchestrator>,
    /// Cancelled on server shutdown; each run takes a child token
    pub shutdown: CancellationToken,
    pub text_model: String,
    pub render_api: String,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::videos::video_routes())
        .merge(handlers::status::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}
