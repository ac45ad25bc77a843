//! Session lifecycle.

use axum::{extract::State, http::StatusCode};

use crate::error::ApiError;
use crate::AppState;

/// Drops everything captured so far. Called when the viewer navigates away.
///
/// # Endpoint
///
/// `DELETE /api/session`
pub async fn reset_session(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.session.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionHandle;
    use lcc_core::{CaptureEvent, CaptureFilter};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reset_session() {
        let state = AppState {
            session: SessionHandle::spawn(),
            filter: Arc::new(CaptureFilter::default()),
        };
        state
            .session
            .ingest(CaptureEvent::new("https://x/get/t/tournament.json", json!({})))
            .await
            .unwrap();

        let status = reset_session(State(state.clone())).await.unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.session.captured().await.unwrap().count, 0);
    }
}
