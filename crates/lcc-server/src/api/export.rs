//! Export API handlers.
//!
//! Provides the merged PGN as a file download and the raw payloads as JSON.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use lcc_core::RawFile;

use crate::error::{ApiError, NO_GAME_DATA};
use crate::AppState;

/// MIME type of PGN downloads.
pub const PGN_CONTENT_TYPE: &str = "application/x-chess-pgn";

/// Export every captured game as one PGN file.
///
/// # Endpoint
///
/// `GET /api/export/pgn`
///
/// # Response
///
/// - `200 OK`: PGN file download named after the players (single game) or
///   the tournament
/// - `404 Not Found`: no game captured yet
pub async fn export_pgn(State(state): State<AppState>) -> Result<Response, ApiError> {
    let export = state
        .session
        .export_pgn()
        .await?
        .ok_or(ApiError::NotFound(NO_GAME_DATA))?;

    tracing::info!(games = export.game_count, "Exported merged PGN");

    Ok((
        [
            (header::CONTENT_TYPE, PGN_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&export.file_name())),
        ],
        export.text,
    )
        .into_response())
}

/// Export every captured payload as pretty-printed JSON.
///
/// # Endpoint
///
/// `GET /api/export/json`
///
/// # Response
///
/// - `200 OK`: `[{"filename", "contents"}, ...]` in capture order
/// - `404 Not Found`: nothing captured yet
pub async fn export_json(State(state): State<AppState>) -> Result<Json<Vec<RawFile>>, ApiError> {
    let files = state.session.export_raw().await?;
    if files.is_empty() {
        return Err(ApiError::NotFound(NO_GAME_DATA));
    }
    Ok(Json(files))
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', ""))
}
