//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One `tick` per display frame, timed transitions on a virtual clock
//! - Seeded RNG only
//! - Collaborators (progress, sound) injected through [`Services`]
//! - No rendering or platform dependencies

pub mod bubble;
pub mod catcher;
pub mod collision;
pub mod equation;
pub mod hex_grid;
pub mod memory;
pub mod particles;

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::{Cue, ToneSignal};
use crate::persistence::{GameId, ProgressStore};

pub use bubble::{BubbleGame, NextBubble, Projectile};
pub use catcher::{Basket, CatcherGame, FallingItem, FallingKind};
pub use collision::{circle_hits_box, circles_overlap, reflect_off_walls};
pub use equation::Equation;
pub use hex_grid::{Cell, HexGeometry, HexGrid};
pub use memory::{Card, CardFace, CardKind, MemoryGame, MemoryPhase};
pub use particles::{Particle, ParticleSystem};

/// Phase of the canvas games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not running
    Idle,
    /// Active gameplay
    Playing,
    /// Level cleared, waiting for acknowledgment
    LevelUp,
    /// Run ended, waiting for acknowledgment
    GameOver,
}

/// Playfield size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Text of the modal shown on a terminal transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub message: String,
    pub button: String,
}

impl Banner {
    pub fn new(title: &str, message: impl Into<String>, button: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            button: button.to_string(),
        }
    }
}

/// Collaborators shared by every simulation instance
#[derive(Clone)]
pub struct Services {
    pub progress: Rc<RefCell<dyn ProgressStore>>,
    pub tone: Rc<dyn ToneSignal>,
    /// Particle cap from settings
    pub max_particles: usize,
}

impl Services {
    pub fn new(
        progress: Rc<RefCell<dyn ProgressStore>>,
        tone: Rc<dyn ToneSignal>,
        max_particles: usize,
    ) -> Self {
        Self {
            progress,
            tone,
            max_particles,
        }
    }

    #[inline]
    pub fn play(&self, cue: Cue) {
        self.tone.play(cue);
    }

    /// Record progress for `game`
    pub fn record(&self, game: GameId, level: u32, score: u64) {
        self.progress.borrow_mut().update(game, level, score);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::audio::CueLog;
    use crate::persistence::ProgressBook;

    /// Services wired to inspectable in-memory collaborators
    pub struct Harness {
        pub book: Rc<RefCell<ProgressBook>>,
        pub cues: Rc<CueLog>,
        pub services: Services,
    }

    pub fn harness() -> Harness {
        let book = Rc::new(RefCell::new(ProgressBook::new()));
        let cues = Rc::new(CueLog::new());
        let services = Services::new(book.clone(), cues.clone(), 10_000);
        Harness {
            book,
            cues,
            services,
        }
    }
}
