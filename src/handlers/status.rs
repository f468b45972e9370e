// src/handlers/status.rs
use axum::{extract::Extension, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

/// GET /api/status - Service health and provider configuration
pub async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": if state.shutdown.is_cancelled() { "shutting_down" } else { "operational" },
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "providers": {
            "text_generation": { "name": "openai", "model": state.text_model },
            "render": { "name": "pictory", "api": state.render_api }
        },
        "endpoints": {
            "generate": "/api/pictory/scenes",
            "generate_stream": "/api/pictory/scenes/stream",
            "status": "/api/status"
        }
    }))
}
