//! Per-game progress (highest unlocked level and best score)
//!
//! Persisted to LocalStorage under a single key shared by all games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Games that keep a progress entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Bubble,
    Memory,
    Catcher,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::Bubble, GameId::Memory, GameId::Catcher];

    /// Key used in the stored JSON object
    pub fn key(&self) -> &'static str {
        match self {
            GameId::Bubble => "bubble",
            GameId::Memory => "memory",
            GameId::Catcher => "catcher",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        GameId::ALL.into_iter().find(|g| g.key() == key)
    }
}

/// Progress of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameProgress {
    /// Highest level unlocked (always at least 1)
    pub max_level: u32,
    /// Best score reached in any session
    pub high_score: u64,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            max_level: 1,
            high_score: 0,
        }
    }
}

impl GameProgress {
    fn repaired(mut self) -> Self {
        self.max_level = self.max_level.max(1);
        self
    }
}

/// Read/update access to stored progress
pub trait ProgressStore {
    /// Progress for `game`, `{1, 0}` if nothing was recorded yet
    fn get(&self, game: GameId) -> GameProgress;

    /// Raise the stored maxima to `level` and `score` and persist immediately
    fn update(&mut self, game: GameId, level: u32, score: u64);
}

/// All recorded progress, plus any entries this build does not recognise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressBook {
    games: BTreeMap<GameId, GameProgress>,
    /// Unknown top-level keys, kept verbatim
    extra: Map<String, Value>,
}

impl ProgressBook {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mathFunHubData";

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored record, repairing anything malformed
    pub fn from_json(json: &str) -> Self {
        let mut book = Self::new();

        let root = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                log::warn!("Stored progress is not an object, starting fresh");
                return book;
            }
            Err(e) => {
                log::warn!("Stored progress unreadable ({}), starting fresh", e);
                return book;
            }
        };

        for (key, value) in root {
            match GameId::from_key(&key) {
                Some(game) => {
                    let progress = serde_json::from_value::<GameProgress>(value)
                        .map(GameProgress::repaired)
                        .unwrap_or_else(|e| {
                            log::warn!("Progress for {} malformed ({}), reset", key, e);
                            GameProgress::default()
                        });
                    book.games.insert(game, progress);
                }
                None => {
                    book.extra.insert(key, value);
                }
            }
        }

        book
    }

    /// Serialize every known game (defaults filled in) and the unknown keys
    pub fn to_json(&self) -> String {
        let mut root = self.extra.clone();
        for game in GameId::ALL {
            let progress = self.get(game);
            let value = serde_json::to_value(progress).unwrap_or(Value::Null);
            root.insert(game.key().to_string(), value);
        }
        Value::Object(root).to_string()
    }

    /// Number of unrecognised keys carried along
    pub fn extra_len(&self) -> usize {
        self.extra.len()
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let book = Self::from_json(&json);
                log::info!("Loaded progress for {} games", book.games.len());
                return book;
            }
        }

        log::info!("No progress found, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::debug!("Progress saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ProgressStore for ProgressBook {
    fn get(&self, game: GameId) -> GameProgress {
        self.games.get(&game).copied().unwrap_or_default()
    }

    fn update(&mut self, game: GameId, level: u32, score: u64) {
        let entry = self.games.entry(game).or_default();
        entry.max_level = entry.max_level.max(level);
        entry.high_score = entry.high_score.max(score);
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_game_defaults() {
        let book = ProgressBook::new();
        for game in GameId::ALL {
            assert_eq!(book.get(game), GameProgress { max_level: 1, high_score: 0 });
        }
    }

    #[test]
    fn test_update_keeps_maxima() {
        let mut book = ProgressBook::new();
        book.update(GameId::Bubble, 3, 120);
        book.update(GameId::Bubble, 2, 40);
        assert_eq!(book.get(GameId::Bubble), GameProgress { max_level: 3, high_score: 120 });

        book.update(GameId::Bubble, 4, 90);
        assert_eq!(book.get(GameId::Bubble), GameProgress { max_level: 4, high_score: 120 });

        // Other games untouched
        assert_eq!(book.get(GameId::Catcher), GameProgress::default());
    }

    #[test]
    fn test_load_merges_defaults_and_keeps_unknown_keys() {
        let json = r#"{"memory":{"maxLevel":5,"highScore":80},"puzzle":{"stars":3}}"#;
        let book = ProgressBook::from_json(json);
        assert_eq!(book.get(GameId::Memory), GameProgress { max_level: 5, high_score: 80 });
        assert_eq!(book.get(GameId::Bubble), GameProgress::default());
        assert_eq!(book.extra_len(), 1);

        let saved: Value = serde_json::from_str(&book.to_json()).unwrap();
        assert_eq!(saved["puzzle"]["stars"], 3);
        assert_eq!(saved["memory"]["maxLevel"], 5);
        assert_eq!(saved["bubble"]["maxLevel"], 1);
        assert_eq!(saved["catcher"]["highScore"], 0);
    }

    #[test]
    fn test_malformed_entries_are_repaired() {
        let json = r#"{"bubble":{"maxLevel":0,"highScore":30},"catcher":"oops","memory":{"highScore":7}}"#;
        let book = ProgressBook::from_json(json);
        assert_eq!(book.get(GameId::Bubble), GameProgress { max_level: 1, high_score: 30 });
        assert_eq!(book.get(GameId::Catcher), GameProgress::default());
        assert_eq!(book.get(GameId::Memory), GameProgress { max_level: 1, high_score: 7 });
    }

    #[test]
    fn test_garbage_record_starts_fresh() {
        assert_eq!(ProgressBook::from_json("not json"), ProgressBook::new());
        assert_eq!(ProgressBook::from_json("[1,2,3]"), ProgressBook::new());
    }

    #[test]
    fn test_game_id_keys() {
        for game in GameId::ALL {
            assert_eq!(GameId::from_key(game.key()), Some(game));
        }
        assert_eq!(GameId::from_key("tetris"), None);
    }
}
