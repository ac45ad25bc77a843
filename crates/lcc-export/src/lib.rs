//! Offline export of Live Chess Cloud captures.
//!
//! This crate replays recorded viewer traffic into an [`lcc_core::Aggregator`]
//! and writes the result to disk.
//!
//! # Modules
//!
//! - [`config`] - `lcc.toml` loading, shared with the capture server
//! - [`capture_log`] - HAR and JSON-lines capture files
//! - [`output`] - PGN and raw JSON files on disk

pub mod capture_log;
pub mod config;
pub mod output;
