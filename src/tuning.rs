//! Difficulty curves
//!
//! Every per-level number the games use lives here so balance can be
//! adjusted without touching simulation code.

/// Bubble grid layout for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleLevel {
    /// Rows filled at level start
    pub initial_rows: usize,
    /// Fraction of the half-width (from centre) that gets filled
    pub fill_ratio: f32,
    /// Largest value placed on the grid
    pub max_value: u8,
}

/// Bubble level table: three hand-made levels, then a slow ramp
pub fn bubble_level(level: u32) -> BubbleLevel {
    let level = level.max(1);
    let (initial_rows, fill_ratio) = match level {
        1 => (3, 0.35),
        2 => (4, 0.6),
        3 => (5, 0.8),
        n => ((5 + (n as usize - 4) / 2).min(10), 1.0),
    };
    BubbleLevel {
        initial_rows,
        fill_ratio,
        max_value: bubble_max_value(level),
    }
}

/// Largest grid value for a bubble level (steps at levels 3 and 6)
pub fn bubble_max_value(level: u32) -> u8 {
    match level {
        0..=2 => 5,
        3..=5 => 8,
        _ => 10,
    }
}

/// Card pairs dealt in a memory level
pub fn memory_pair_count(level: u32) -> usize {
    match level {
        0 | 1 => 3,
        2 => 6,
        3 => 8,
        _ => 10,
    }
}

/// Board columns used to lay out a memory deck
pub fn memory_columns(pair_count: usize) -> usize {
    if pair_count <= 3 { 3 } else { 4 }
}

/// Catcher pacing for one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatcherLevel {
    /// Frames between spawns
    pub spawn_interval: u32,
    /// Multiplier applied to every fall speed
    pub speed_scale: f32,
    /// Chance that a spawn is a hazard
    pub hazard_chance: f64,
    /// Largest target answer asked
    pub max_target: u8,
}

pub fn catcher_level(level: u32) -> CatcherLevel {
    let level = level.max(1);
    CatcherLevel {
        spawn_interval: 120u32.saturating_sub(5 * level).max(40),
        speed_scale: 1.0 + 0.1 * level as f32,
        hazard_chance: (0.05 * (level - 1) as f64).min(0.2),
        max_target: if level == 1 { 5 } else { 10 },
    }
}

/// Chance that a spawned value is the right answer
pub const CORRECT_SPAWN_CHANCE: f64 = 0.4;
/// Hazards fall this much faster than the level's base speed
pub const HAZARD_SPEED_FACTOR: f32 = 1.2;
/// Value entities fall at `speed_scale * U[MIN, MAX)`
pub const VALUE_SPEED_JITTER: (f32, f32) = (0.8, 1.3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubble_table_explicit_levels() {
        assert_eq!(bubble_level(1), BubbleLevel { initial_rows: 3, fill_ratio: 0.35, max_value: 5 });
        assert_eq!(bubble_level(2), BubbleLevel { initial_rows: 4, fill_ratio: 0.6, max_value: 5 });
        assert_eq!(bubble_level(3), BubbleLevel { initial_rows: 5, fill_ratio: 0.8, max_value: 8 });
    }

    #[test]
    fn test_bubble_formula_levels() {
        assert_eq!(bubble_level(4).initial_rows, 5);
        assert_eq!(bubble_level(5).initial_rows, 5);
        assert_eq!(bubble_level(6).initial_rows, 6);
        assert_eq!(bubble_level(6).max_value, 10);
        assert_eq!(bubble_level(14).initial_rows, 10);
        assert_eq!(bubble_level(40).initial_rows, 10);
        assert_eq!(bubble_level(7).fill_ratio, 1.0);
    }

    #[test]
    fn test_max_value_non_decreasing() {
        let mut prev = 0;
        for level in 1..50 {
            let v = bubble_max_value(level);
            assert!(v >= prev);
            assert!((1..=crate::consts::MAX_ANSWER).contains(&v));
            prev = v;
        }
    }

    #[test]
    fn test_memory_pairs() {
        assert_eq!(memory_pair_count(1), 3);
        assert_eq!(memory_pair_count(2), 6);
        assert_eq!(memory_pair_count(3), 8);
        assert_eq!(memory_pair_count(4), 10);
        assert_eq!(memory_pair_count(99), 10);
        assert_eq!(memory_columns(3), 3);
        assert_eq!(memory_columns(6), 4);
    }

    #[test]
    fn test_catcher_curve() {
        let l1 = catcher_level(1);
        assert_eq!(l1.spawn_interval, 115);
        assert!((l1.speed_scale - 1.1).abs() < 1e-6);
        assert_eq!(l1.hazard_chance, 0.0);
        assert_eq!(l1.max_target, 5);

        let l3 = catcher_level(3);
        assert_eq!(l3.spawn_interval, 105);
        assert!((l3.hazard_chance - 0.1).abs() < 1e-9);
        assert_eq!(l3.max_target, 10);

        let l30 = catcher_level(30);
        assert_eq!(l30.spawn_interval, 40);
        assert!((l30.hazard_chance - 0.2).abs() < 1e-9);
    }
}
