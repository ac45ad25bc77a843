//! Capture boundary: the events fed into an [`Aggregator`](crate::Aggregator)
//! and the filter deciding which responses are worth capturing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON response observed by a capture front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    /// Request URL the response belongs to.
    pub url: String,
    /// Parsed response body.
    pub data: Value,
}

impl CaptureEvent {
    pub fn new(url: impl Into<String>, data: Value) -> Self {
        Self {
            url: url.into(),
            data,
        }
    }

    /// Builds an event from a raw response body.
    ///
    /// Returns `None` when the body is not valid JSON; such responses are
    /// dropped without an error since the viewer will fetch them again.
    pub fn from_body(url: impl Into<String>, body: &str) -> Option<Self> {
        let url = url.into();
        match serde_json::from_str(body) {
            Ok(data) => Some(Self { url, data }),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Skipping non-JSON response");
                None
            }
        }
    }
}

/// Anything that consumes capture events.
///
/// Front ends (HAR replay, the HTTP sink, tests) push events through this
/// trait without knowing how they are stored.
pub trait CaptureSink {
    fn accept(&mut self, event: CaptureEvent);
}

impl CaptureSink for Vec<CaptureEvent> {
    fn accept(&mut self, event: CaptureEvent) {
        self.push(event);
    }
}

/// Selects the responses to capture by URL.
///
/// A URL is captured when it contains every marker. The defaults match the
/// viewer's data endpoints (`https://<pool>/get/<id>/...json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFilter {
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

fn default_markers() -> Vec<String> {
    vec!["/get/".to_string(), ".json".to_string()]
}

impl Default for CaptureFilter {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

impl CaptureFilter {
    /// Whether a response from `url` should be captured.
    pub fn matches(&self, url: &str) -> bool {
        self.markers.iter().all(|marker| url.contains(marker.as_str()))
    }
}
