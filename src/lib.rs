//! Math Fun Hub - arithmetic mini-games for kids
//!
//! Core modules:
//! - `sim`: Frame-stepped simulations (bubble grid, memory pairs, answer catcher)
//! - `hub`: Screen navigation and dispatch to the active simulation
//! - `renderer`: Display-list scenes and the Canvas2D painter
//! - `platform`: Pointer input mapping
//! - `persistence`: Per-game progress record
//! - `audio`: Synthesized sound cues
//! - `tuning`: Data-driven difficulty curves

pub mod audio;
pub mod hub;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{Cue, ToneSignal};
pub use hub::{GameHub, GameKind, Screen};
pub use persistence::{GameId, GameProgress, ProgressBook, ProgressStore};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one display frame at 60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Same frame expressed in milliseconds (virtual clock of timed transitions)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Points awarded per removed bubble, matched pair or correct catch
    pub const POINTS_PER_HIT: u64 = 10;
    /// Largest answer any game asks for
    pub const MAX_ANSWER: u8 = 10;

    /// Bubble tiles never grow past this radius
    pub const MAX_TILE_RADIUS: f32 = 25.0;
    /// Narrow fields fit at least this many tile radii across
    pub const TILE_RADII_ACROSS: f32 = 22.0;
    /// Launcher sits this far above the bottom edge
    pub const LAUNCHER_OFFSET: f32 = 50.0;
    /// Projectile speed (pixels per frame)
    pub const PROJECTILE_SPEED: f32 = 15.0;
    /// Shots stay at least this far above horizontal (radians)
    pub const MIN_AIM_ELEVATION: f32 = 0.15;
    /// Contact slack subtracted from the tile diameter before snapping
    pub const SNAP_SLACK: f32 = 5.0;
    /// Downward acceleration of bubble particles (pixels per frame²)
    pub const PARTICLE_GRAVITY: f32 = 0.5;

    /// Catcher basket geometry
    pub const BASKET_WIDTH: f32 = 100.0;
    pub const BASKET_HEIGHT: f32 = 60.0;
    /// Basket top sits this far above the bottom edge
    pub const BASKET_OFFSET: f32 = 80.0;
    /// Radius of falling answers and hazards
    pub const FALLING_RADIUS: f32 = 25.0;
    /// Rotation added to each falling entity per frame
    pub const FALLING_SPIN: f32 = 0.02;
    pub const STARTING_LIVES: u8 = 3;
    pub const CATCH_GOAL: u32 = 10;

    /// Delay before a matching pair locks in
    pub const MATCH_DELAY_MS: f64 = 500.0;
    /// Delay before a mismatched pair flips back
    pub const MISMATCH_DELAY_MS: f64 = 1000.0;
    /// Delay between the last match and the win banner
    pub const WIN_DELAY_MS: f64 = 500.0;
    /// Deal animation length; flips are ignored until it completes
    pub const DEAL_DELAY_MS: f64 = 300.0;
}

/// Bubble palette indexed by value (index 0 is the neutral grey)
pub const VALUE_COLORS: [[f32; 4]; 11] = [
    rgb(0xA0, 0xA0, 0xA0),
    rgb(0xFF, 0x6B, 0x6B),
    rgb(0x4E, 0xCD, 0xC4),
    rgb(0x45, 0xB7, 0xD1),
    rgb(0x96, 0xCE, 0xB4),
    rgb(0xFF, 0xEE, 0xAD),
    rgb(0xD4, 0xA5, 0xA5),
    rgb(0x9B, 0x59, 0xB6),
    rgb(0x34, 0x98, 0xDB),
    rgb(0xE6, 0x7E, 0x22),
    rgb(0x2E, 0xCC, 0x71),
];

/// Colour for a value, falling back to light grey outside the palette
#[inline]
pub fn value_color(value: u8) -> [f32; 4] {
    VALUE_COLORS
        .get(value as usize)
        .copied()
        .unwrap_or(rgb(0xCC, 0xCC, 0xCC))
}

/// Build an opaque RGBA colour from 8-bit channels
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}
