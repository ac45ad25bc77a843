//! Core types for Live Chess Cloud captures.
//!
//! This crate turns the JSON payloads the Live Chess Cloud viewer fetches
//! into a merged PGN document:
//! - [`Aggregator`] stores every captured payload and sorts it into
//!   tournament info, round pairings and game records
//! - [`Route`] classifies a payload by the shape of its URL
//! - [`pgn`] renders the aggregated games as PGN
//! - [`raw`] re-exports the captured payloads as pretty-printed JSON
//! - [`filename`] derives download names for both export modes
//! - [`capture`] holds the capture event type, sink trait and URL filter

mod aggregator;
pub mod capture;
pub mod filename;
mod model;
pub mod pgn;
pub mod raw;
mod route;

pub use aggregator::{Aggregator, CapturedResponse};
pub use capture::{CaptureEvent, CaptureFilter, CaptureSink};
pub use model::{
    compare_round_ids, Chess960, GameKey, GameRecord, GameResult, Pairing, PlayerRef,
    RoundPairings, TournamentInfo,
};
pub use pgn::PgnExport;
pub use raw::RawFile;
pub use route::Route;
