//! URL classification for captured payloads.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::GameKey;

static ROUND_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"round-([0-9]+)/index\.json").unwrap());

static ROUND_GAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"round-([0-9]+)/game-([0-9]+)\.json").unwrap());

/// What a captured URL refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `.../tournament.json`
    Tournament,
    /// `.../round-<N>/index.json`
    RoundIndex { round: String },
    /// `.../round-<N>/game-<M>.json`
    Game(GameKey),
    /// Anything else. Kept only in the raw capture map.
    Unrecognized,
}

type Matcher = fn(&str) -> Option<Route>;

/// Matchers in priority order; the first hit wins.
const MATCHERS: [Matcher; 3] = [match_tournament, match_round_index, match_game];

impl Route {
    /// Classifies a URL.
    pub fn classify(url: &str) -> Self {
        MATCHERS
            .iter()
            .find_map(|matcher| matcher(url))
            .unwrap_or(Route::Unrecognized)
    }

    /// Short label used in logs and listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Route::Tournament => "tournament",
            Route::RoundIndex { .. } => "round",
            Route::Game(_) => "game",
            Route::Unrecognized => "other",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Tournament => f.write_str("tournament"),
            Route::RoundIndex { round } => write!(f, "round {}", round),
            Route::Game(key) => write!(f, "round {} game {}", key.round, key.game),
            Route::Unrecognized => f.write_str("unrecognized"),
        }
    }
}

fn match_tournament(url: &str) -> Option<Route> {
    url.contains("tournament.json").then_some(Route::Tournament)
}

fn match_round_index(url: &str) -> Option<Route> {
    let caps = ROUND_INDEX.captures(url)?;
    Some(Route::RoundIndex {
        round: caps[1].to_string(),
    })
}

fn match_game(url: &str) -> Option<Route> {
    let caps = ROUND_GAME.captures(url)?;
    Some(Route::Game(GameKey::new(&caps[1], &caps[2])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://1.pool.livechesscloud.com/get/8f1c5e2a-tour/";

    #[test]
    fn test_tournament_url() {
        let url = format!("{}tournament.json", BASE);
        assert_eq!(Route::classify(&url), Route::Tournament);
    }

    #[test]
    fn test_round_index_url() {
        let url = format!("{}round-4/index.json", BASE);
        assert_eq!(
            Route::classify(&url),
            Route::RoundIndex {
                round: "4".to_string()
            }
        );
    }

    #[test]
    fn test_game_url() {
        let url = format!("{}round-7/game-3.json?poll=1", BASE);
        assert_eq!(Route::classify(&url), Route::Game(GameKey::new("7", "3")));
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(
            Route::classify("https://view.livechesscloud.com/config.json"),
            Route::Unrecognized
        );
        assert_eq!(
            Route::classify(&format!("{}round-x/game-1.json", BASE)),
            Route::Unrecognized
        );
        assert_eq!(Route::classify(""), Route::Unrecognized);
    }

    #[test]
    fn test_non_ascii_digits_are_not_round_numbers() {
        assert_eq!(
            Route::classify(&format!("{}round-٣/game-١.json", BASE)),
            Route::Unrecognized
        );
        assert_eq!(
            Route::classify(&format!("{}round-٣/index.json", BASE)),
            Route::Unrecognized
        );
    }

    #[test]
    fn test_tournament_match_takes_priority() {
        // A path that also looks like a game still counts as tournament data.
        let url = format!("{}round-1/game-1.json/tournament.json", BASE);
        assert_eq!(Route::classify(&url), Route::Tournament);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(Route::Tournament.kind(), "tournament");
        assert_eq!(Route::Game(GameKey::new("1", "2")).kind(), "game");
        assert_eq!(
            Route::Game(GameKey::new("1", "2")).to_string(),
            "round 1 game 2"
        );
    }

    proptest! {
        #[test]
        fn prop_game_urls_keep_their_numbers(round in 1u32..10_000, game in 1u32..500) {
            let url = format!("{}round-{}/game-{}.json", BASE, round, game);
            prop_assert_eq!(
                Route::classify(&url),
                Route::Game(GameKey::new(round.to_string(), game.to_string()))
            );
        }

        #[test]
        fn prop_round_index_urls_are_never_games(round in 1u32..10_000) {
            let url = format!("{}round-{}/index.json", BASE, round);
            prop_assert_eq!(
                Route::classify(&url),
                Route::RoundIndex { round: round.to_string() }
            );
        }
    }
}
