//! Loading recorded viewer traffic.
//!
//! Two formats are understood:
//! - HAR files exported from the browser's network panel
//! - JSON-lines logs with one `{"url": ..., "data": ...}` object per line
//!
//! Entries whose URL fails the [`CaptureFilter`] or whose body is not JSON are
//! skipped, the same way a live capture ignores them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use lcc_core::{Aggregator, CaptureEvent, CaptureFilter, Route};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading capture files.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// A capture file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A `.har` file is not a valid HTTP archive.
    #[error("Invalid HAR file {}: {source}", .path.display())]
    Har {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A directory could not be scanned for capture files.
    #[error("Failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        source: glob::PatternError,
    },
    /// An input path does not exist.
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// File extensions picked up when a directory is given as input.
pub const CAPTURE_EXTENSIONS: [&str; 2] = ["har", "jsonl"];

/// One captured response, with the time it was recorded when the log has it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub event: CaptureEvent,
    pub captured_at: Option<DateTime<Utc>>,
}

impl CaptureRecord {
    /// Feeds the record into an aggregator, keeping the recorded time.
    pub fn replay(self, aggregator: &mut Aggregator) -> Route {
        match self.captured_at {
            Some(at) => aggregator.ingest_at(&self.event.url, self.event.data, at),
            None => aggregator.ingest_event(self.event),
        }
    }
}

#[derive(Deserialize)]
struct Har {
    log: HarLog,
}

#[derive(Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarEntry {
    #[serde(default)]
    started_date_time: Option<String>,
    request: HarRequest,
    #[serde(default)]
    response: HarResponse,
}

#[derive(Deserialize)]
struct HarRequest {
    url: String,
}

#[derive(Deserialize, Default)]
struct HarResponse {
    #[serde(default)]
    content: HarContent,
}

#[derive(Deserialize, Default)]
struct HarContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl HarContent {
    fn body(&self) -> Option<String> {
        let text = self.text.as_deref()?;
        if self.encoding.as_deref() == Some("base64") {
            let bytes = STANDARD.decode(text).ok()?;
            String::from_utf8(bytes).ok()
        } else {
            Some(text.to_string())
        }
    }
}

/// Extracts the captured responses from a HAR document.
///
/// # Errors
///
/// Fails only if the document itself is not a HAR archive; individual entries
/// without a JSON body are skipped.
pub fn parse_har(content: &str, filter: &CaptureFilter) -> Result<Vec<CaptureRecord>, serde_json::Error> {
    let har: Har = serde_json::from_str(content)?;

    Ok(har
        .log
        .entries
        .into_iter()
        .filter(|entry| filter.matches(&entry.request.url))
        .filter_map(|entry| {
            let body = entry.response.content.body()?;
            let event = CaptureEvent::from_body(entry.request.url, &body)?;
            let captured_at = entry
                .started_date_time
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
            Some(CaptureRecord { event, captured_at })
        })
        .collect())
}

/// Extracts the captured responses from a JSON-lines log.
///
/// Blank lines and lines that are not a `{"url", "data"}` object are skipped.
pub fn parse_jsonl(content: &str, filter: &CaptureFilter) -> Vec<CaptureRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str::<CaptureEvent>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(line = index + 1, error = %e, "Skipping malformed capture line");
                None
            }
        })
        .filter(|event| filter.matches(&event.url))
        .map(|event| CaptureRecord {
            event,
            captured_at: None,
        })
        .collect()
}

/// Reads one capture file. `.har` files are parsed as HTTP archives,
/// anything else as JSON lines.
pub fn load_file(path: &Path, filter: &CaptureFilter) -> Result<Vec<CaptureRecord>, CaptureError> {
    let content = std::fs::read_to_string(path).map_err(|source| CaptureError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records = if is_har(path) {
        parse_har(&content, filter).map_err(|source| CaptureError::Har {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_jsonl(&content, filter)
    };

    tracing::debug!(path = %path.display(), count = records.len(), "Loaded capture file");
    Ok(records)
}

fn is_har(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("har"))
}

/// Expands the input list: files are kept as given, directories are replaced
/// by the `.har` and `.jsonl` files directly inside them, sorted by path.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CaptureError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for ext in CAPTURE_EXTENSIONS {
                let pattern = format!(
                    "{}/*.{}",
                    glob::Pattern::escape(&input.to_string_lossy()),
                    ext
                );
                let paths = glob::glob(&pattern).map_err(|source| CaptureError::Scan {
                    path: input.clone(),
                    source,
                })?;
                found.extend(paths.filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unreadable path");
                        None
                    }
                }));
            }
            found.sort();
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(CaptureError::NotFound(input.clone()));
        }
    }

    Ok(files)
}

/// Replays every input into a fresh aggregator, in input order.
pub fn load_session(inputs: &[PathBuf], filter: &CaptureFilter) -> Result<Aggregator, CaptureError> {
    let mut aggregator = Aggregator::new();

    for path in expand_inputs(inputs)? {
        for record in load_file(&path, filter)? {
            record.replay(&mut aggregator);
        }
    }

    tracing::info!(
        captured = aggregator.captured_count(),
        games = aggregator.game_count(),
        "Session loaded"
    );
    Ok(aggregator)
}
