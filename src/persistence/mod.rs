//! Local progress record
//!
//! Features:
//! - One `{maxLevel, highScore}` entry per game, stored as a JSON object
//! - Repair of missing or malformed entries against defaults
//! - Unknown game keys survive a load/save cycle untouched

pub mod progress;

pub use progress::{GameId, GameProgress, ProgressBook, ProgressStore};
