use axum::{
    extract::{ConnectInfo, MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Structured request logging; also echoes the request id back to the caller.
///
/// Streaming responses are logged when headers are sent, not when the stream ends.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        "incoming request"
    );

    let mut response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;
    match status {
        500..=599 => tracing::error!(
            request_id = %request_id, method = %method, path = %path, status, duration_ms,
            "request completed (server error)"
        ),
        400..=499 => tracing::warn!(
            request_id = %request_id, method = %method, path = %path, status, duration_ms,
            "request completed (client error)"
        ),
        _ => tracing::info!(
            request_id = %request_id, method = %method, path = %path, status, duration_ms,
            "request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
