//! Request timing middleware.
//!
//! Captures arrive in bursts while the viewer polls, so a slow handler shows
//! up as a growing backlog in the session task. Logging slow requests makes
//! that visible.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};

/// Requests taking longer than this are logged at `warn`.
pub const SLOW_REQUEST: Duration = Duration::from_millis(100);

/// Response extension set by the capture handler: what the captured URL was
/// classified as (`tournament`, `round`, `game`, `other`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureKind(pub &'static str);

/// Logs method, path, status and duration of every request, plus the
/// [`CaptureKind`] for capture posts.
///
/// # Example
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use lcc_server::middleware::timing_layer;
///
/// let app = Router::new()
///     .route("/health", get(|| async { "ok" }))
///     .layer(middleware::from_fn(timing_layer));
/// ```
pub async fn timing_layer(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    let duration_ms = elapsed.as_millis();
    let capture = capture_kind(&response).unwrap_or("-");

    if is_slow(elapsed) {
        tracing::warn!(%method, %path, status, capture, duration_ms, "Slow request");
    } else {
        tracing::debug!(%method, %path, status, capture, duration_ms, "Request handled");
    }

    response
}

fn capture_kind(response: &Response) -> Option<&'static str> {
    response.extensions().get::<CaptureKind>().map(|kind| kind.0)
}

fn is_slow(elapsed: Duration) -> bool {
    elapsed > SLOW_REQUEST
}
