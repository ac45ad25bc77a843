//! PGN (Portable Game Notation) generation for captured games.
//!
//! This module merges every game held by an [`Aggregator`] into one PGN
//! document that chess databases and analysis tools can import directly.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::aggregator::Aggregator;
use crate::filename;
use crate::model::{Chess960, GameKey, GameRecord, Pairing, PlayerRef, TournamentInfo};

/// `Event` tag used when the tournament name is unknown.
pub const DEFAULT_EVENT: &str = "Live Chess Cloud";

/// Value of the `Site` tag.
pub const SITE: &str = "view.livechesscloud.com";

/// Player name used when no pairing data is available.
pub const UNKNOWN_PLAYER: &str = "Unknown";

/// FEN emitted for numbered Chess960 games.
///
/// Always the standard start position: deriving the real position from the
/// start-position number is not implemented yet.
pub const CHESS960_PLACEHOLDER_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Escapes a value for use inside a PGN tag.
pub fn escape_tag_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Formats a player for the `White`/`Black` tags.
pub fn player_name(player: Option<&PlayerRef>) -> String {
    player
        .and_then(PlayerRef::display_name)
        .unwrap_or_else(|| UNKNOWN_PLAYER.to_string())
}

/// Renders the move text of a game, ending with the result token.
///
/// Clock data after each move is dropped: `["e4 100", "e5 120", "Nf3 90"]`
/// with an unknown result renders as `1. e4 e5 2. Nf3 *`.
pub fn move_text(game: &GameRecord) -> String {
    let mut text = String::new();
    for (i, notation) in game.notations().enumerate() {
        if i % 2 == 0 {
            text.push_str(&format!("{}. ", i / 2 + 1));
        }
        text.push_str(notation);
        text.push(' ');
    }
    text.push_str(game.result.as_pgn());
    text.trim().to_string()
}

fn tag(name: &str, value: &str) -> String {
    format!("[{} \"{}\"]", name, escape_tag_value(value))
}

/// Converts one captured game to a PGN record.
///
/// # Arguments
///
/// * `game` - The captured game.
/// * `key` - Round and game number the game was captured under.
/// * `tournament` - Tournament info, used for the `Event` tag.
/// * `pairing` - The game's pairing, used for the player tags.
/// * `now` - Export time, used as `Date` when the game has no first-move time.
///
/// # Format
///
/// Tags in fixed order (Event, Site, Date, Round, White, Black, Result, then
/// Variant/SetUp/FEN for Chess960 games and GameID when the board serial
/// number is known), a blank line, and the move text on one line. The record
/// ends with a newline.
pub fn game_to_pgn(
    game: &GameRecord,
    key: &GameKey,
    tournament: Option<&TournamentInfo>,
    pairing: Option<&Pairing>,
    now: DateTime<Utc>,
) -> String {
    let event = tournament
        .and_then(|t| t.name.as_deref())
        .unwrap_or(DEFAULT_EVENT);
    let date = game.first_move.unwrap_or(now).format("%Y.%m.%d").to_string();
    let white = player_name(pairing.and_then(|p| p.white.as_ref()));
    let black = player_name(pairing.and_then(|p| p.black.as_ref()));

    let mut headers = vec![
        tag("Event", event),
        tag("Site", SITE),
        tag("Date", &date),
        tag("Round", &key.round),
        tag("White", &white),
        tag("Black", &black),
        tag("Result", game.result.as_pgn()),
    ];

    if let Some(variant) = game.chess960.as_ref().filter(|v| v.is_variant()) {
        headers.push(tag("Variant", "Chess960"));
        if let Chess960::Position(_) = variant {
            headers.push(tag("SetUp", "1"));
            headers.push(tag("FEN", CHESS960_PLACEHOLDER_FEN));
        }
    }

    if let Some(serial) = &game.serial_nr {
        headers.push(tag("GameID", serial));
    }

    format!("{}\n\n{}\n", headers.join("\n"), move_text(game))
}

/// Renders every captured game as one PGN document. See [`render_at`].
pub fn render(aggregator: &Aggregator) -> Option<String> {
    render_at(aggregator, Utc::now())
}

/// Renders every captured game as one PGN document.
///
/// Games whose round pairings were captured come first, by round number and
/// board order. Games without pairing data follow in the order they were
/// captured. Each game appears exactly once; records are separated by a
/// blank line.
///
/// Returns `None` when no game has been captured.
pub fn render_at(aggregator: &Aggregator, now: DateTime<Utc>) -> Option<String> {
    if !aggregator.has_games() {
        return None;
    }

    let tournament = aggregator.tournament();
    let mut blocks = Vec::with_capacity(aggregator.game_count());
    let mut processed: HashSet<GameKey> = HashSet::new();

    for (round, pairings) in aggregator.rounds_sorted() {
        for (index, pairing) in pairings.pairings.iter().enumerate() {
            let key = GameKey::new(round, (index + 1).to_string());
            if let Some(game) = aggregator.game(&key) {
                blocks.push(game_to_pgn(game, &key, tournament, Some(pairing), now));
                processed.insert(key);
            }
        }
    }

    for (key, game) in aggregator.games() {
        if processed.contains(key) {
            continue;
        }
        let pairing = aggregator.pairing_for(key);
        blocks.push(game_to_pgn(game, key, tournament, pairing, now));
    }

    Some(blocks.join("\n").trim_end().to_string())
}

/// A rendered PGN download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnExport {
    /// The merged PGN document.
    pub text: String,
    /// File name without extension.
    pub filename: String,
    /// Number of games in the document.
    pub game_count: usize,
}

impl PgnExport {
    /// Renders the aggregator's games, or `None` if there are none yet.
    pub fn from_aggregator(aggregator: &Aggregator) -> Option<Self> {
        Self::from_aggregator_at(aggregator, Utc::now())
    }

    pub fn from_aggregator_at(aggregator: &Aggregator, now: DateTime<Utc>) -> Option<Self> {
        let text = render_at(aggregator, now)?;
        Some(Self {
            text,
            filename: filename::pgn_filename(aggregator),
            game_count: aggregator.game_count(),
        })
    }

    /// File name with a `.pgn` extension, safe to create on disk.
    pub fn file_name(&self) -> String {
        filename::with_extension(&self.filename, "pgn")
    }
}
