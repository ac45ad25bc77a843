//! Typed views of the payloads served by the Live Chess Cloud viewer.
//!
//! The viewer's JSON has no published schema, so every field is optional and
//! decoded leniently: a field of the wrong type reads as absent instead of
//! rejecting the whole payload.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Tournament metadata from `tournament.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TournamentInfo {
    /// Display name of the tournament.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// A player as listed in a round's pairings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerRef {
    /// FIDE title such as `GM` or `WIM`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, rename = "fname", deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, rename = "mname", deserialize_with = "lenient_string")]
    pub middle_name: Option<String>,
    #[serde(default, rename = "lname", deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
}

impl PlayerRef {
    /// Space-joined title and name parts, or `None` if every part is missing.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.title,
            &self.first_name,
            &self.middle_name,
            &self.last_name,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();

        let name = parts.join(" ").trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// One board of a round: who plays white and who plays black.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pairing {
    #[serde(default, deserialize_with = "lenient_player")]
    pub white: Option<PlayerRef>,
    #[serde(default, deserialize_with = "lenient_player")]
    pub black: Option<PlayerRef>,
}

/// Pairing list from `round-<N>/index.json`.
///
/// Entry `i` describes game number `i + 1` of the round. Entries that are not
/// objects decode as an empty [`Pairing`] so the positions of the others are
/// preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoundPairings {
    #[serde(default, deserialize_with = "lenient_pairings")]
    pub pairings: Vec<Pairing>,
}

/// Outcome of a game as reported by the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
    /// Game in progress, or a result token we do not recognise.
    #[default]
    Unknown,
}

impl GameResult {
    /// Parses either the viewer's (`WHITEWIN`) or the PGN (`1-0`) spelling.
    pub fn from_token(token: &str) -> Self {
        match token {
            "WHITEWIN" | "1-0" => GameResult::WhiteWin,
            "BLACKWIN" | "0-1" => GameResult::BlackWin,
            "DRAW" | "1/2-1/2" => GameResult::Draw,
            _ => GameResult::Unknown,
        }
    }

    /// The PGN result token.
    pub fn as_pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

impl<'de> Deserialize<'de> for GameResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::from_token).unwrap_or_default())
    }
}

/// The `chess960` field of a game record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chess960 {
    /// The literal `"STANDARD"`: a normal game.
    Standard,
    /// A numeric start position. `None` when the number is not a whole,
    /// positive index (`-5`, `1.5`); such games still get a FEN.
    Position(Option<u32>),
    /// Any other truthy marker. Still exported as a Chess960 game, without a FEN.
    Other(String),
}

impl Chess960 {
    /// Reads the field value. Falsy values (`0`, `""`, `false`, `null`) mean
    /// the game is not Chess960 and yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == "STANDARD" => Some(Chess960::Standard),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(Chess960::Other(s.clone())),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(Chess960::Position(position_index(n))),
            Value::Bool(true) => Some(Chess960::Other("true".to_string())),
            _ => None,
        }
    }

    /// Whether the game should be tagged as a Chess960 game.
    pub fn is_variant(&self) -> bool {
        !matches!(self, Chess960::Standard)
    }
}

fn position_index(n: &serde_json::Number) -> Option<u32> {
    if let Some(v) = n.as_u64() {
        return u32::try_from(v).ok();
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= 1.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

/// A single game from `round-<N>/game-<M>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Moves in play order, each a notation token optionally followed by
    /// clock data, e.g. `"d4 4925+534"`.
    #[serde(default, deserialize_with = "lenient_moves")]
    pub moves: Vec<String>,
    #[serde(default)]
    pub result: GameResult,
    /// Board serial number shown by the viewer.
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial_nr: Option<String>,
    #[serde(default, deserialize_with = "lenient_chess960")]
    pub chess960: Option<Chess960>,
    /// When the first move was played.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub first_move: Option<DateTime<Utc>>,
}

impl GameRecord {
    /// Move notation tokens with the clock data stripped.
    pub fn notations(&self) -> impl Iterator<Item = &str> + '_ {
        self.moves
            .iter()
            .filter_map(|mv| mv.split_whitespace().next())
    }
}

/// Identifies a game by the round and game numbers in its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub round: String,
    pub game: String,
}

impl GameKey {
    pub fn new(round: impl Into<String>, game: impl Into<String>) -> Self {
        Self {
            round: round.into(),
            game: game.into(),
        }
    }

    /// Zero-based index of this game in its round's pairing list.
    pub fn pairing_index(&self) -> Option<usize> {
        self.game.parse::<usize>().ok()?.checked_sub(1)
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.round, self.game)
    }
}

/// Orders round identifiers by numeric value.
///
/// Numeric ids come first; anything that does not parse sorts after them in
/// string order. Ties between equal numbers (`"1"`, `"01"`) fall back to
/// string order so the result is total.
pub fn compare_round_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_player<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PlayerRef>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_object() {
        Ok(PlayerRef::deserialize(&value).ok())
    } else {
        Ok(None)
    }
}

fn lenient_pairings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Pairing>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .map(|item| {
            if item.is_object() {
                Pairing::deserialize(item).unwrap_or_default()
            } else {
                Pairing::default()
            }
        })
        .collect())
}

fn lenient_moves<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn lenient_chess960<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Chess960>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(Chess960::from_value(&value))
}

// Accepts epoch milliseconds (what the viewer sends), RFC 3339 or a bare date.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .filter(|ms| *ms != 0)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn player(title: Option<&str>, first: Option<&str>, last: Option<&str>) -> PlayerRef {
        PlayerRef {
            title: title.map(String::from),
            first_name: first.map(String::from),
            middle_name: None,
            last_name: last.map(String::from),
        }
    }

    #[test]
    fn test_game_record_decodes_viewer_payload() {
        let payload = json!({
            "moves": ["d4 4925+534", "Nf6 5100+12", "c4"],
            "result": "WHITEWIN",
            "serialNr": "7",
            "chess960": "STANDARD",
            "firstMove": 1717243200000i64
        });

        let game = GameRecord::deserialize(&payload).unwrap();

        assert_eq!(game.moves.len(), 3);
        assert_eq!(game.result, GameResult::WhiteWin);
        assert_eq!(game.serial_nr.as_deref(), Some("7"));
        assert_eq!(game.chess960, Some(Chess960::Standard));
        assert_eq!(
            game.first_move.unwrap().format("%Y.%m.%d").to_string(),
            "2024.06.01"
        );
        assert_eq!(game.notations().collect::<Vec<_>>(), vec!["d4", "Nf6", "c4"]);
    }

    #[test]
    fn test_game_record_tolerates_wrong_field_types() {
        let payload = json!({
            "moves": "e4 e5",
            "result": 1,
            "serialNr": {"nested": true},
            "chess960": null,
            "firstMove": "not a date"
        });

        let game = GameRecord::deserialize(&payload).unwrap();

        assert_eq!(game, GameRecord::default());
    }

    #[test]
    fn test_non_string_moves_are_skipped() {
        let payload = json!({ "moves": ["e4", 17, null, "e5 300"] });
        let game = GameRecord::deserialize(&payload).unwrap();
        assert_eq!(game.notations().collect::<Vec<_>>(), vec!["e4", "e5"]);
    }

    #[test]
    fn test_numeric_serial_number_is_stringified() {
        let game = GameRecord::deserialize(&json!({ "serialNr": 42 })).unwrap();
        assert_eq!(game.serial_nr.as_deref(), Some("42"));
    }

    #[test]
    fn test_first_move_accepts_rfc3339_and_plain_dates() {
        let game = GameRecord::deserialize(&json!({ "firstMove": "2023-11-05T14:00:00+02:00" }))
            .unwrap();
        assert_eq!(
            game.first_move.unwrap().to_rfc3339(),
            "2023-11-05T12:00:00+00:00"
        );

        let game = GameRecord::deserialize(&json!({ "firstMove": "2023-11-05" })).unwrap();
        assert_eq!(game.first_move.unwrap().format("%Y.%m.%d").to_string(), "2023.11.05");

        let game = GameRecord::deserialize(&json!({ "firstMove": 0 })).unwrap();
        assert!(game.first_move.is_none());
    }

    #[test]
    fn test_result_tokens() {
        assert_eq!(GameResult::from_token("WHITEWIN"), GameResult::WhiteWin);
        assert_eq!(GameResult::from_token("1-0"), GameResult::WhiteWin);
        assert_eq!(GameResult::from_token("BLACKWIN"), GameResult::BlackWin);
        assert_eq!(GameResult::from_token("0-1"), GameResult::BlackWin);
        assert_eq!(GameResult::from_token("DRAW"), GameResult::Draw);
        assert_eq!(GameResult::from_token("1/2-1/2"), GameResult::Draw);
        assert_eq!(GameResult::from_token("NONE"), GameResult::Unknown);
        assert_eq!(GameResult::from_token(""), GameResult::Unknown);
        assert_eq!(GameResult::Draw.to_string(), "1/2-1/2");
        assert_eq!(GameResult::Unknown.as_pgn(), "*");
    }

    #[test]
    fn test_chess960_values() {
        assert_eq!(Chess960::from_value(&json!("STANDARD")), Some(Chess960::Standard));
        assert_eq!(Chess960::from_value(&json!(518)), Some(Chess960::Position(Some(518))));
        assert_eq!(Chess960::from_value(&json!(518.0)), Some(Chess960::Position(Some(518))));
        assert_eq!(Chess960::from_value(&json!(-5)), Some(Chess960::Position(None)));
        assert_eq!(Chess960::from_value(&json!(1.5)), Some(Chess960::Position(None)));
        assert_eq!(Chess960::from_value(&json!(1e10)), Some(Chess960::Position(None)));
        assert_eq!(
            Chess960::from_value(&json!("RANDOM")),
            Some(Chess960::Other("RANDOM".to_string()))
        );
        assert_eq!(Chess960::from_value(&json!(0)), None);
        assert_eq!(Chess960::from_value(&json!("")), None);
        assert_eq!(Chess960::from_value(&json!(false)), None);
        assert_eq!(Chess960::from_value(&Value::Null), None);

        assert!(!Chess960::Standard.is_variant());
        assert!(Chess960::Position(Some(1)).is_variant());
        assert!(Chess960::Position(None).is_variant());
    }

    #[test]
    fn test_player_display_name() {
        assert_eq!(
            player(Some("GM"), Some("Magnus"), Some("Carlsen")).display_name(),
            Some("GM Magnus Carlsen".to_string())
        );
        assert_eq!(
            player(None, None, Some("Carlsen")).display_name(),
            Some("Carlsen".to_string())
        );
        assert_eq!(player(None, None, None).display_name(), None);

        let full = PlayerRef::deserialize(&json!({
            "title": "IM",
            "fname": "Anna",
            "mname": "Maria",
            "lname": "Nowak"
        }))
        .unwrap();
        assert_eq!(full.display_name().as_deref(), Some("IM Anna Maria Nowak"));
    }

    #[test]
    fn test_empty_name_parts_are_ignored() {
        let p = PlayerRef::deserialize(&json!({ "title": "", "fname": "Hou", "lname": "Yifan" }))
            .unwrap();
        assert_eq!(p.display_name().as_deref(), Some("Hou Yifan"));
    }

    #[test]
    fn test_round_pairings_keep_positions() {
        let payload = json!({
            "pairings": [
                { "white": { "lname": "A" }, "black": { "lname": "B" } },
                null,
                { "white": "bye", "black": { "lname": "D" } }
            ]
        });

        let round = RoundPairings::deserialize(&payload).unwrap();

        assert_eq!(round.pairings.len(), 3);
        assert_eq!(round.pairings[1], Pairing::default());
        assert!(round.pairings[2].white.is_none());
        assert_eq!(
            round.pairings[2].black.as_ref().and_then(|p| p.display_name()),
            Some("D".to_string())
        );
    }

    #[test]
    fn test_round_pairings_without_array() {
        let round = RoundPairings::deserialize(&json!({ "pairings": "oops" })).unwrap();
        assert!(round.pairings.is_empty());
    }

    #[test]
    fn test_game_key_pairing_index() {
        assert_eq!(GameKey::new("1", "1").pairing_index(), Some(0));
        assert_eq!(GameKey::new("1", "12").pairing_index(), Some(11));
        assert_eq!(GameKey::new("1", "0").pairing_index(), None);
        assert_eq!(GameKey::new("3", "2").to_string(), "3-2");
    }

    #[test]
    fn test_compare_round_ids_is_numeric() {
        let mut ids = vec!["10", "2", "1", "x", "01"];
        ids.sort_by(|a, b| compare_round_ids(a, b));
        assert_eq!(ids, vec!["01", "1", "2", "10", "x"]);
    }
}
