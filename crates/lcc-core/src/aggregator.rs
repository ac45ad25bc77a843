//! Session-scoped accumulation of captured payloads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capture::{CaptureEvent, CaptureSink};
use crate::model::{compare_round_ids, GameKey, GameRecord, Pairing, RoundPairings, TournamentInfo};
use crate::route::Route;

/// A payload as it was captured, keyed by its URL in the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub url: String,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
}

/// Everything captured during one viewing session.
///
/// Payloads are only ever added or replaced; a URL captured twice keeps the
/// latest payload but its original position in [`captured_entries`]. Games
/// keep the order in which they were first seen.
///
/// [`captured_entries`]: Aggregator::captured_entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregator {
    captured: IndexMap<String, CapturedResponse>,
    tournament: Option<TournamentInfo>,
    rounds: HashMap<String, RoundPairings>,
    games: IndexMap<GameKey, GameRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a payload captured now. See [`Aggregator::ingest_at`].
    pub fn ingest(&mut self, url: &str, payload: Value) -> Route {
        self.ingest_at(url, payload, Utc::now())
    }

    /// Records a payload and files it under the category its URL names.
    ///
    /// Never fails: payloads with unexpected shapes are stored with whatever
    /// could be read from them, and unrecognized URLs only land in the raw
    /// capture map. Returns the route the URL was classified as.
    pub fn ingest_at(&mut self, url: &str, payload: Value, captured_at: DateTime<Utc>) -> Route {
        let route = Route::classify(url);

        match &route {
            Route::Tournament => {
                self.tournament = Some(decode(url, &payload));
            }
            Route::RoundIndex { round } => {
                self.rounds.insert(round.clone(), decode(url, &payload));
            }
            Route::Game(key) => {
                self.games.insert(key.clone(), decode(url, &payload));
            }
            Route::Unrecognized => {}
        }

        tracing::debug!(url = %url, route = %route, "Captured payload");

        self.captured.insert(
            url.to_string(),
            CapturedResponse {
                url: url.to_string(),
                payload,
                captured_at,
            },
        );

        route
    }

    pub fn ingest_event(&mut self, event: CaptureEvent) -> Route {
        self.ingest(&event.url, event.data)
    }

    /// Number of distinct URLs captured.
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }

    /// Captured payloads in first-capture order.
    pub fn captured_entries(&self) -> impl Iterator<Item = (&str, &CapturedResponse)> {
        self.captured.iter().map(|(url, entry)| (url.as_str(), entry))
    }

    pub fn tournament(&self) -> Option<&TournamentInfo> {
        self.tournament.as_ref()
    }

    pub fn tournament_name(&self) -> Option<&str> {
        self.tournament.as_ref()?.name.as_deref()
    }

    pub fn round(&self, round: &str) -> Option<&RoundPairings> {
        self.rounds.get(round)
    }

    /// Captured rounds ordered by round number.
    pub fn rounds_sorted(&self) -> Vec<(&str, &RoundPairings)> {
        let mut rounds: Vec<(&str, &RoundPairings)> = self
            .rounds
            .iter()
            .map(|(id, pairings)| (id.as_str(), pairings))
            .collect();
        rounds.sort_by(|a, b| compare_round_ids(a.0, b.0));
        rounds
    }

    pub fn game(&self, key: &GameKey) -> Option<&GameRecord> {
        self.games.get(key)
    }

    /// Captured games in first-capture order.
    pub fn games(&self) -> impl Iterator<Item = (&GameKey, &GameRecord)> {
        self.games.iter()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn has_games(&self) -> bool {
        !self.games.is_empty()
    }

    /// The pairing for a game, looked up by position in its round's list.
    pub fn pairing_for(&self, key: &GameKey) -> Option<&Pairing> {
        let index = key.pairing_index()?;
        self.rounds.get(&key.round)?.pairings.get(index)
    }

    /// Drops everything captured so far.
    pub fn clear(&mut self) {
        self.captured.clear();
        self.tournament = None;
        self.rounds.clear();
        self.games.clear();
    }
}

impl CaptureSink for Aggregator {
    fn accept(&mut self, event: CaptureEvent) {
        self.ingest_event(event);
    }
}

fn decode<T>(url: &str, payload: &Value) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    T::deserialize(payload).unwrap_or_else(|e| {
        tracing::warn!(url = %url, error = %e, "Unexpected payload shape, storing defaults");
        T::default()
    })
}
