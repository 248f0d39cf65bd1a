//! Bubble shooter: fire a bubble carrying `a+b`, land it next to bubbles
//! showing the answer to pop them.

use glam::Vec2;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{circles_overlap, reflect_off_walls};
use super::equation::Equation;
use super::hex_grid::{Cell, HexGeometry, HexGrid};
use super::particles::ParticleSystem;
use super::{Banner, Field, Phase, Services};
use crate::audio::Cue;
use crate::consts::*;
use crate::persistence::GameId;
use crate::tuning;
use crate::value_color;

/// Bubble waiting in the launcher
#[derive(Debug, Clone, PartialEq)]
pub struct NextBubble {
    pub value: u8,
    pub equation: Equation,
}

/// Bubble in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub value: u8,
    pub equation: Equation,
}

/// Particles per popped bubble
const POP_PARTICLES: usize = 5;
/// Frames a pop particle lives
const POP_PARTICLE_LIFE: u32 = 30;

/// Aim angle towards `d`, kept within `[-π + MIN_AIM_ELEVATION, -MIN_AIM_ELEVATION]`
fn clamp_aim(d: Vec2) -> f32 {
    use std::f32::consts::PI;
    let lowest_left = -PI + MIN_AIM_ELEVATION;
    let angle = d.y.atan2(d.x);
    if angle > -MIN_AIM_ELEVATION {
        if d.x < 0.0 { lowest_left } else { -MIN_AIM_ELEVATION }
    } else {
        angle.max(lowest_left)
    }
}

/// Bubble shooter simulation
pub struct BubbleGame {
    field: Field,
    geometry: HexGeometry,
    grid: HexGrid,
    particles: ParticleSystem,
    phase: Phase,
    level: u32,
    score: u64,
    max_value: u8,
    /// Aim angle in radians (screen space, -π/2 is straight up)
    angle: f32,
    next: Option<NextBubble>,
    projectile: Option<Projectile>,
    rng: Pcg32,
    services: Services,
}

impl BubbleGame {
    pub fn new(field: Field, services: Services, seed: u64) -> Self {
        let geometry = HexGeometry::for_field(field);
        Self {
            field,
            geometry,
            grid: HexGrid::new(geometry.rows, geometry.cols),
            particles: ParticleSystem::new(PARTICLE_GRAVITY, services.max_particles),
            phase: Phase::Idle,
            level: 1,
            score: 0,
            max_value: tuning::bubble_max_value(1),
            angle: -std::f32::consts::FRAC_PI_2,
            next: None,
            projectile: None,
            rng: Pcg32::seed_from_u64(seed),
            services,
        }
    }

    /// Start a new session at level 1 (ignored while already playing)
    pub fn start(&mut self) {
        if self.phase == Phase::Playing {
            return;
        }
        self.recompute_geometry();
        self.score = 0;
        self.init_level(1);
    }

    /// Stop the frame loop and discard the live projectile
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.projectile = None;
    }

    /// Adopt a new field size
    ///
    /// Walls and the launcher follow the new size at once. Mid-level the
    /// grid keeps its tile layout, since its row and column counts depend on
    /// the geometry; the layout catches up when the next level is built.
    pub fn resize(&mut self, field: Field) {
        self.field = field;
        if self.phase == Phase::Idle {
            self.recompute_geometry();
        }
    }

    fn recompute_geometry(&mut self) {
        self.geometry = HexGeometry::for_field(self.field);
    }

    /// Build the grid for `level` and start playing it
    pub fn init_level(&mut self, level: u32) {
        let level = level.max(1);
        self.level = level;
        self.recompute_geometry();
        self.grid = HexGrid::new(self.geometry.rows, self.geometry.cols);
        self.services.record(GameId::Bubble, level, self.score);

        let config = tuning::bubble_level(level);
        self.max_value = config.max_value;

        let cols = self.geometry.cols;
        let center = (cols as f32 - 1.0) / 2.0;
        let half_width = cols as f32 / 2.0;
        for row in 0..config.initial_rows.min(self.geometry.rows) {
            for col in 0..cols {
                let dist = (col as f32 - center).abs() / half_width;
                if dist <= config.fill_ratio {
                    let value = self.rng.random_range(1..=self.max_value);
                    self.grid.set((row, col), Some(value));
                }
            }
        }

        self.particles.clear();
        self.projectile = None;
        self.next = None;
        self.phase = Phase::Playing;
        log::info!(
            "Bubble level {} ({} bubbles, values 1..={})",
            level,
            self.grid.occupied_count(),
            self.max_value
        );
        self.prepare_next();
    }

    /// Load the launcher with an equation for a value still on the grid
    ///
    /// An empty grid means the level is cleared.
    fn prepare_next(&mut self) {
        let Some(target) = self.grid.distinct_values().into_iter().choose(&mut self.rng) else {
            self.win();
            return;
        };
        self.next = Some(NextBubble {
            value: target,
            equation: Equation::split(target, &mut self.rng),
        });
    }

    /// Launcher position
    pub fn launcher_pos(&self) -> Vec2 {
        Vec2::new(self.field.width / 2.0, self.field.height - LAUNCHER_OFFSET)
    }

    /// Point the launcher at `target`
    ///
    /// The aim is clamped to strictly upward angles so every shot reaches
    /// the ceiling or the grid; level or downward targets pick the nearest
    /// allowed angle on the same side.
    pub fn aim_at(&mut self, target: Vec2) {
        if self.phase != Phase::Playing {
            return;
        }
        self.angle = clamp_aim(target - self.launcher_pos());
    }

    /// Launch the loaded bubble along the aim line
    pub fn fire(&mut self) {
        if self.phase != Phase::Playing || self.projectile.is_some() {
            return;
        }
        let Some(next) = &self.next else { return };

        self.services.play(Cue::Shoot);
        let dir = Vec2::new(self.angle.cos(), self.angle.sin());
        self.projectile = Some(Projectile {
            pos: self.launcher_pos(),
            vel: dir * PROJECTILE_SPEED,
            radius: self.geometry.tile_radius,
            value: next.value,
            equation: next.equation,
        });
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.particles.tick();
        if self.phase == Phase::Playing {
            self.step_projectile();
        }
    }

    fn step_projectile(&mut self) {
        let Some(mut p) = self.projectile.take() else {
            return;
        };

        p.pos += p.vel;
        reflect_off_walls(&mut p.pos, &mut p.vel, p.radius, 0.0, self.field.width);

        let reach = self.geometry.diameter - SNAP_SLACK;
        let touching = p.pos.y - p.radius < 0.0
            || self
                .grid
                .occupied()
                .any(|(cell, _)| circles_overlap(self.geometry.cell_center(cell), p.pos, reach));

        if touching {
            self.snap(p);
        } else {
            self.projectile = Some(p);
        }
    }

    /// Settle a projectile into the nearest empty cell and resolve matches
    fn snap(&mut self, projectile: Projectile) {
        let Some(cell) = self.grid.nearest_empty(&self.geometry, projectile.pos) else {
            log::debug!("No empty cell left, projectile discarded");
            self.prepare_next();
            return;
        };

        let value = projectile.value;
        self.grid.set(cell, Some(value));
        let matches = self.grid.find_matches(cell);
        let hit_target = self.grid.has_matching_neighbor(cell, value);
        log::debug!("Snapped {} at {:?}, component of {}", value, cell, matches.len());

        if hit_target {
            self.services.play(Cue::Pop);
            self.remove_cells(&matches);
            self.drop_floating();
        } else if cell.0 + 2 >= self.grid.rows() {
            self.game_over();
            return;
        }

        self.prepare_next();
    }

    /// Pop cells, awarding points for each one that held a bubble
    fn remove_cells(&mut self, cells: &[Cell]) {
        for &cell in cells {
            if let Some(value) = self.grid.take(cell) {
                self.burst(cell, value);
                self.score += POINTS_PER_HIT;
            }
        }
        self.services.record(GameId::Bubble, self.level, self.score);
    }

    /// Drop every bubble no longer hanging from the ceiling
    fn drop_floating(&mut self) {
        let floating = self.grid.floating_cells();
        if !floating.is_empty() {
            log::debug!("Dropping {} floating bubbles", floating.len());
        }
        self.remove_cells(&floating);
    }

    fn burst(&mut self, cell: Cell, value: u8) {
        let pos = self.geometry.cell_center(cell);
        self.particles.burst(
            &mut self.rng,
            pos,
            POP_PARTICLES,
            POP_PARTICLE_LIFE,
            value_color(value),
            (2.0, 7.0),
        );
    }

    fn win(&mut self) {
        self.phase = Phase::LevelUp;
        self.next = None;
        self.services.play(Cue::Win);
        self.services.record(GameId::Bubble, self.level + 1, self.score);
        log::info!("Bubble level {} cleared, score {}", self.level, self.score);
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.services.play(Cue::Lose);
        log::info!("Bubble game over at level {}, score {}", self.level, self.score);
    }

    /// Dismiss the level-up or game-over banner
    ///
    /// Level-up moves on to the next level; game over starts a fresh session.
    pub fn acknowledge(&mut self) {
        match self.phase {
            Phase::LevelUp => self.init_level(self.level + 1),
            Phase::GameOver => {
                self.score = 0;
                self.init_level(1);
            }
            Phase::Idle | Phase::Playing => {}
        }
    }

    /// Modal text for the current phase
    pub fn banner(&self) -> Option<Banner> {
        match self.phase {
            Phase::LevelUp => Some(Banner::new(
                "太棒了！",
                format!("完成了第 {} 关！", self.level),
                "下一关",
            )),
            Phase::GameOver => Some(Banner::new("游戏结束", "再试一次？", "重玩")),
            Phase::Idle | Phase::Playing => None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_value(&self) -> u8 {
        self.max_value
    }

    pub fn aim_angle(&self) -> f32 {
        self.angle
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn geometry(&self) -> &HexGeometry {
        &self.geometry
    }

    pub fn next_bubble(&self) -> Option<&NextBubble> {
        self.next.as_ref()
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::ProgressStore;
    use crate::sim::testing::{Harness, harness};
    use proptest::prelude::*;

    const FIELD: Field = Field::new(500.0, 700.0);

    fn started(seed: u64) -> (Harness, BubbleGame) {
        let h = harness();
        let mut game = BubbleGame::new(FIELD, h.services.clone(), seed);
        game.start();
        (h, game)
    }

    fn clear_grid(game: &mut BubbleGame) {
        game.grid = HexGrid::new(game.geometry.rows, game.geometry.cols);
    }

    fn projectile_at(game: &BubbleGame, cell: Cell, value: u8) -> Projectile {
        Projectile {
            pos: game.geometry.cell_center(cell),
            vel: Vec2::ZERO,
            radius: game.geometry.tile_radius,
            value,
            equation: Equation { a: value, b: 0 },
        }
    }

    #[test]
    fn test_start_fills_grid_and_loads_launcher() {
        let (h, game) = started(42);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.grid().occupied_count() > 0);

        let next = game.next_bubble().expect("launcher loaded");
        assert_eq!(next.equation.answer(), next.value);
        assert!(game.grid().distinct_values().contains(&next.value));

        assert_eq!(h.book.borrow().get(GameId::Bubble).max_level, 1);
    }

    #[test]
    fn test_level_one_fill_is_centred() {
        let (_h, game) = started(3);
        let cols = game.geometry().cols;
        for ((row, col), value) in game.grid().occupied() {
            assert!(row < 3);
            assert!((1..=5).contains(&value));
            let dist = (col as f32 - (cols as f32 - 1.0) / 2.0).abs() / (cols as f32 / 2.0);
            assert!(dist <= 0.35);
        }
        // Edge columns stay empty at 35% fill
        assert_eq!(game.grid().get((0, 0)), None);
        assert_eq!(game.grid().get((0, cols - 1)), None);
    }

    #[test]
    fn test_matching_pair_pops_both_cells() {
        let (h, mut game) = started(11);
        clear_grid(&mut game);
        game.grid.set((0, 4), Some(3));

        let p = projectile_at(&game, (0, 5), 3);
        game.snap(p);

        assert_eq!(game.grid().occupied_count(), 0);
        assert_eq!(game.score(), 20);
        assert_ne!(game.phase(), Phase::GameOver);
        // Grid emptied, so the level is won
        assert_eq!(game.phase(), Phase::LevelUp);
        assert_eq!(h.cues.count(Cue::Pop), 1);
        assert_eq!(h.cues.count(Cue::Win), 1);

        let progress = h.book.borrow().get(GameId::Bubble);
        assert_eq!(progress.high_score, 20);
        assert_eq!(progress.max_level, 2);
    }

    #[test]
    fn test_match_does_not_double_count_when_dropping() {
        let (_h, mut game) = started(12);
        clear_grid(&mut game);
        // Ceiling bubble keeps the 2 hanging; the 2 holds up a 4 below it
        game.grid.set((0, 2), Some(1));
        game.grid.set((1, 2), Some(2));
        game.grid.set((2, 3), Some(4));

        // Land a 2 next to the existing 2 at (1,3)
        let p = projectile_at(&game, (1, 3), 2);
        game.snap(p);

        // Two matched + the 4 that lost its support; the 1 stays
        assert_eq!(game.score(), 30);
        assert_eq!(game.grid().occupied_count(), 1);
        assert_eq!(game.grid().get((0, 2)), Some(1));
        assert!(game.grid().floating_cells().is_empty());
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.next_bubble().unwrap().value, 1);
    }

    #[test]
    fn test_miss_near_bottom_is_game_over() {
        let (h, mut game) = started(13);
        clear_grid(&mut game);
        game.grid.set((0, 0), Some(5));
        let before = game.next_bubble().cloned();

        let bottom = game.grid().rows() - 1;
        let p = projectile_at(&game, (bottom, 3), 2);
        game.snap(p);

        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(h.cues.count(Cue::Lose), 1);
        // No new bubble once the run has ended
        assert_eq!(game.next_bubble().cloned(), before);
        assert_eq!(game.banner().unwrap().button, "重玩");
    }

    #[test]
    fn test_miss_higher_up_keeps_playing() {
        let (_h, mut game) = started(14);
        clear_grid(&mut game);
        game.grid.set((0, 0), Some(5));
        let p = projectile_at(&game, (0, 4), 2);
        game.snap(p);

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.grid().get((0, 4)), Some(2));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_full_grid_snap_is_noop() {
        let (_h, mut game) = started(15);
        for row in 0..game.grid.rows() {
            for col in 0..game.grid.cols() {
                game.grid.set((row, col), Some(((row + col) % 5 + 1) as u8));
            }
        }
        let before = game.grid.clone();
        let p = projectile_at(&game, (3, 3), 1);
        game.snap(p);
        assert_eq!(game.grid, before);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_fire_and_fly_to_ceiling() {
        let (h, mut game) = started(16);
        clear_grid(&mut game);
        game.grid.set((0, 0), Some(4));
        game.next = Some(NextBubble {
            value: 4,
            equation: Equation { a: 1, b: 3 },
        });

        // Straight up through the empty middle of the field
        game.aim_at(Vec2::new(game.launcher_pos().x, 0.0));
        game.fire();
        assert!(game.projectile().is_some());
        assert_eq!(h.cues.count(Cue::Shoot), 1);

        // A second fire while in flight is ignored
        game.fire();
        assert_eq!(h.cues.count(Cue::Shoot), 1);

        let mut frames = 0;
        while game.projectile().is_some() && frames < 200 {
            game.tick();
            frames += 1;
        }
        assert!(frames < 200);
        // Landed in the top row near the centre
        let placed: Vec<_> = game
            .grid()
            .occupied()
            .filter(|&(cell, _)| cell != (0, 0))
            .collect();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].1, 4);
        assert_eq!((placed[0].0).0, 0);
    }

    #[test]
    fn test_wall_bounce_keeps_projectile_inside() {
        let (_h, mut game) = started(17);
        clear_grid(&mut game);
        game.grid.set((0, 0), Some(4));
        game.aim_at(game.launcher_pos() + Vec2::new(-100.0, -20.0));
        game.fire();
        for _ in 0..300 {
            if let Some(p) = game.projectile() {
                assert!(p.pos.x - p.radius >= -0.001);
                assert!(p.pos.x + p.radius <= game.field().width + 0.001);
            }
            game.tick();
        }
        assert!(game.projectile().is_none());
    }

    #[test]
    fn test_level_shot_still_lands() {
        for dx in [100.0, -100.0] {
            let (_h, mut game) = started(18);
            let before = game.grid().clone();
            game.aim_at(game.launcher_pos() + Vec2::new(dx, 0.0));
            game.fire();
            let vel = game.projectile().map(|p| p.vel).unwrap_or_default();
            assert!(vel.y < 0.0);
            assert_eq!(vel.x.signum(), f32::signum(dx));

            let mut frames = 0;
            while game.projectile().is_some() && frames < 2_000 {
                game.tick();
                frames += 1;
            }
            assert!(game.projectile().is_none(), "shot never settled");
            assert!(game.grid() != &before || game.phase() != Phase::Playing);
        }
    }

    #[test]
    fn test_downward_aim_is_clamped_upward() {
        let (_h, mut game) = started(18);
        game.aim_at(game.launcher_pos() + Vec2::new(0.0, 100.0));
        game.fire();
        let p = game.projectile().expect("shot fired");
        assert!(p.vel.y < 0.0);
        for _ in 0..2_000 {
            game.tick();
        }
        assert!(game.projectile().is_none());
    }

    #[test]
    fn test_acknowledge_level_up_and_game_over() {
        let (h, mut game) = started(19);
        clear_grid(&mut game);
        game.grid.set((0, 4), Some(3));
        game.snap(projectile_at(&game, (0, 5), 3));
        assert_eq!(game.phase(), Phase::LevelUp);
        assert_eq!(game.banner().unwrap().message, "完成了第 1 关！");

        game.acknowledge();
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.level(), 2);
        assert_eq!(game.score(), 20);

        game.game_over();
        game.acknowledge();
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 0);
        assert_eq!(h.book.borrow().get(GameId::Bubble).max_level, 2);
    }

    #[test]
    fn test_start_while_playing_is_ignored() {
        let (_h, mut game) = started(20);
        let grid = game.grid().clone();
        game.start();
        assert_eq!(game.grid(), &grid);

        game.stop();
        assert_eq!(game.phase(), Phase::Idle);
        game.fire();
        assert!(game.projectile().is_none());
    }

    #[test]
    fn test_resize_mid_level_keeps_grid_layout() {
        let (_h, mut game) = started(21);
        let geometry = game.geometry;
        let narrow = Field::new(300.0, 700.0);

        game.resize(narrow);
        assert_eq!(game.field(), narrow);
        assert_eq!(game.launcher_pos().x, 150.0);
        assert_eq!(game.geometry, geometry);

        game.init_level(2);
        assert_eq!(game.geometry, HexGeometry::for_field(narrow));
        assert!(game.geometry.tile_radius < geometry.tile_radius);
    }

    #[test]
    fn test_particles_age_with_gravity() {
        let (_h, mut game) = started(21);
        clear_grid(&mut game);
        game.grid.set((0, 4), Some(3));
        game.grid.set((0, 6), Some(1));
        game.snap(projectile_at(&game, (0, 5), 3));
        assert_eq!(game.particles().len(), 2 * POP_PARTICLES);

        for _ in 0..POP_PARTICLE_LIFE {
            game.tick();
        }
        assert!(game.particles().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_level_values_in_range(level in 1u32..30, seed in any::<u64>()) {
            let h = harness();
            let mut game = BubbleGame::new(FIELD, h.services.clone(), seed);
            game.init_level(level);
            let max = tuning::bubble_max_value(level);
            prop_assert_eq!(game.max_value(), max);
            for (_, value) in game.grid().occupied() {
                prop_assert!((1..=max).contains(&value));
            }
        }

        #[test]
        fn prop_score_is_ten_per_removed_cell(seed in any::<u64>(), shots in 1usize..40) {
            let h = harness();
            let mut game = BubbleGame::new(FIELD, h.services.clone(), seed);
            game.start();
            let mut removed = 0u64;
            let mut last_score = 0;
            for i in 0..shots {
                if game.phase() != Phase::Playing {
                    break;
                }
                let Some(next) = game.next_bubble().cloned() else { break };
                // Land next to a pseudo-random bubble, as a real shot would
                let occupied: Vec<Cell> = game.grid.occupied().map(|(cell, _)| cell).collect();
                let anchor = occupied[(seed as usize).wrapping_add(i * 7) % occupied.len()];
                let safe_rows = game.grid.rows() - 2;
                let Some(target) = game
                    .grid
                    .neighbors(anchor)
                    .into_iter()
                    .find(|&c| c.0 < safe_rows && game.grid.get(c).is_none())
                else {
                    continue;
                };
                let before = game.grid.occupied_count() as u64;
                let p = Projectile {
                    pos: game.geometry.cell_center(target),
                    vel: Vec2::ZERO,
                    radius: game.geometry.tile_radius,
                    value: next.value,
                    equation: next.equation,
                };
                game.snap(p);
                let after = game.grid.occupied_count() as u64;
                removed += before + 1 - after;
                prop_assert!(game.score() >= last_score);
                last_score = game.score();
                prop_assert!(game.grid.floating_cells().is_empty());
            }
            prop_assert_eq!(game.score(), 10 * removed);
        }
    }
}
