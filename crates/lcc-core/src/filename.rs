//! Download file names for PGN and raw JSON exports.

use std::sync::LazyLock;

use regex::Regex;

use crate::aggregator::Aggregator;
use crate::pgn::player_name;

/// Fallback PGN file name when the tournament name is unknown.
pub const DEFAULT_PGN_STEM: &str = "tournament";

/// Fallback raw file name when the URL has no `<name>.json` segment.
pub const DEFAULT_RAW_STEM: &str = "data";

const PLAYER_NAME_LIMIT: usize = 30;
const TOURNAMENT_NAME_LIMIT: usize = 50;

static JSON_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/([^/]+)\.json").unwrap());

/// File name (without extension) for the merged PGN.
///
/// A single captured game is named after its players and result, e.g.
/// `GM_Magnus_Carlsen_-_Hikaru_Nakamura_-_1-0`. Otherwise the file is named
/// after the tournament.
pub fn pgn_filename(aggregator: &Aggregator) -> String {
    if aggregator.game_count() == 1 {
        if let Some((key, game)) = aggregator.games().next() {
            let pairing = aggregator.pairing_for(key);
            let white = player_name(pairing.and_then(|p| p.white.as_ref()));
            let black = player_name(pairing.and_then(|p| p.black.as_ref()));
            return format!(
                "{}_-_{}_-_{}",
                clean_player_name(&white),
                clean_player_name(&black),
                game.result.as_pgn()
            );
        }
    }
    tournament_stem(aggregator.tournament_name())
}

/// Keeps ASCII letters, digits and whitespace, turns each whitespace run into
/// one underscore and cuts the result to 30 characters.
pub fn clean_player_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push('_');
            }
            in_whitespace = true;
        } else if c.is_ascii_alphanumeric() {
            cleaned.push(c);
            in_whitespace = false;
        }
    }
    cleaned.chars().take(PLAYER_NAME_LIMIT).collect()
}

/// Tournament name with everything but ASCII letters and digits removed, cut
/// to 50 characters. Falls back to `tournament`.
pub fn tournament_stem(name: Option<&str>) -> String {
    let stem: String = name
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(TOURNAMENT_NAME_LIMIT)
        .collect();
    if stem.is_empty() {
        DEFAULT_PGN_STEM.to_string()
    } else {
        stem
    }
}

/// File name for a raw capture: the first `<name>.json` path segment of the
/// URL, or `data.json`.
pub fn raw_filename(url: &str) -> String {
    let stem = JSON_SEGMENT
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_RAW_STEM.to_string());
    with_extension(&stem, "json")
}

/// Appends an extension, replacing path separators so the name stays a single
/// path component (draw results contain a `/`).
pub fn with_extension(stem: &str, extension: &str) -> String {
    let safe: String = stem
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.{}", safe, extension)
}
