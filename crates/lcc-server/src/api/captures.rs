//! Capture ingestion and listing.

use axum::{extract::State, http::StatusCode, Extension, Json};
use lcc_core::CaptureEvent;
use lcc_server::middleware::CaptureKind;

use crate::error::ApiError;
use crate::session::CapturedSnapshot;
use crate::AppState;

/// Records one captured response.
///
/// # Endpoint
///
/// `POST /api/captures` with a `{"url": ..., "data": ...}` body.
///
/// # Response
///
/// - `202 Accepted`: the payload was added to the session; the route it was
///   filed under travels as a [`CaptureKind`] extension for request logging
///
/// The sender is expected to have filtered URLs already. Payloads outside the
/// configured capture filter are still stored, only logged.
pub async fn post_capture(
    State(state): State<AppState>,
    Json(event): Json<CaptureEvent>,
) -> Result<(StatusCode, Extension<CaptureKind>), ApiError> {
    if !state.filter.matches(&event.url) {
        tracing::warn!(url = %event.url, "Capture outside the configured filter");
    }

    let url = event.url.clone();
    let route = state.session.ingest(event).await?;
    tracing::info!(url = %url, kind = route.kind(), "Captured");

    Ok((StatusCode::ACCEPTED, Extension(CaptureKind(route.kind()))))
}

/// Lists every captured payload.
///
/// # Endpoint
///
/// `GET /api/captures`
///
/// # Response
///
/// `{"count": n, "data": [[url, {"url", "data", "timestamp"}], ...]}` in
/// capture order.
pub async fn list_captures(
    State(state): State<AppState>,
) -> Result<Json<CapturedSnapshot>, ApiError> {
    Ok(Json(state.session.captured().await?))
}
