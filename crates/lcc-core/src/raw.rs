//! Raw JSON export of every captured payload.

use serde::Serialize;

use crate::aggregator::Aggregator;
use crate::filename::raw_filename;

/// One captured payload, ready to be saved as a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFile {
    /// `<last url segment>.json`. Not unique: several rounds all have a
    /// `game-1.json`.
    pub filename: String,
    /// The payload pretty-printed with two-space indentation.
    pub contents: String,
}

/// Pretty-prints every captured payload, in capture order.
pub fn export(aggregator: &Aggregator) -> Vec<RawFile> {
    aggregator
        .captured_entries()
        .map(|(url, entry)| RawFile {
            filename: raw_filename(url),
            contents: serde_json::to_string_pretty(&entry.payload)
                .unwrap_or_else(|_| entry.payload.to_string()),
        })
        .collect()
}
