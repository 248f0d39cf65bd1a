//! Falling-object catcher: steer the basket under the right answer and
//! stay clear of the bombs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::circle_hits_box;
use super::equation::Equation;
use super::particles::ParticleSystem;
use super::{Banner, Field, Phase, Services};
use crate::audio::Cue;
use crate::consts::*;
use crate::persistence::GameId;
use crate::rgb;
use crate::tuning::{self, CatcherLevel};

/// Particles per catch
const CATCH_PARTICLES: usize = 8;
/// Frames a catch particle lives
const CATCH_PARTICLE_LIFE: u32 = 20;

const CORRECT_COLOR: [f32; 4] = rgb(0x2E, 0xCC, 0x71);
const WRONG_COLOR: [f32; 4] = rgb(0x55, 0x55, 0x55);
const HAZARD_COLOR: [f32; 4] = rgb(0x00, 0x00, 0x00);

/// Player-controlled catcher, positioned by its top-centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basket {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Basket {
    fn for_field(field: Field) -> Self {
        Self {
            x: field.width / 2.0,
            y: field.height - BASKET_OFFSET,
            width: BASKET_WIDTH,
            height: BASKET_HEIGHT,
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x - self.width / 2.0, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallingKind {
    /// Number to catch (or avoid when it is not the answer)
    Value(u8),
    /// Ends the run when caught
    Hazard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallingItem {
    pub kind: FallingKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Pixels per frame
    pub speed: f32,
    pub rotation: f32,
}

/// Catcher simulation
pub struct CatcherGame {
    field: Field,
    phase: Phase,
    level: u32,
    score: u64,
    lives: u8,
    progress: u32,
    goal: u32,
    config: CatcherLevel,
    question: Equation,
    spawn_timer: u32,
    basket: Basket,
    items: Vec<FallingItem>,
    particles: ParticleSystem,
    rng: Pcg32,
    services: Services,
}

impl CatcherGame {
    pub fn new(field: Field, services: Services, seed: u64) -> Self {
        Self {
            field,
            phase: Phase::Idle,
            level: 1,
            score: 0,
            lives: STARTING_LIVES,
            progress: 0,
            goal: CATCH_GOAL,
            config: tuning::catcher_level(1),
            question: Equation { a: 0, b: 1 },
            spawn_timer: 0,
            basket: Basket::for_field(field),
            items: Vec::new(),
            particles: ParticleSystem::new(0.0, services.max_particles),
            rng: Pcg32::seed_from_u64(seed),
            services,
        }
    }

    /// Start a new session at level 1 (ignored while already playing)
    pub fn start(&mut self) {
        if self.phase == Phase::Playing {
            return;
        }
        self.resize(self.field);
        self.score = 0;
        self.init_level(1);
    }

    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Adopt a new field size, keeping the basket inside it
    pub fn resize(&mut self, field: Field) {
        self.field = field;
        self.basket.y = field.height - BASKET_OFFSET;
        self.move_basket(self.basket.x);
    }

    pub fn init_level(&mut self, level: u32) {
        let level = level.max(1);
        self.level = level;
        self.items.clear();
        self.particles.clear();
        self.lives = STARTING_LIVES;
        self.progress = 0;
        self.goal = CATCH_GOAL;
        self.spawn_timer = 0;
        self.services.record(GameId::Catcher, level, self.score);

        self.config = tuning::catcher_level(level);
        self.generate_question();
        self.phase = Phase::Playing;
        log::info!(
            "Catcher level {} (spawn every {} frames, speed x{:.1})",
            level,
            self.config.spawn_interval,
            self.config.speed_scale
        );
    }

    fn generate_question(&mut self) {
        self.question = Equation::random(self.config.max_target, &mut self.rng);
    }

    /// Centre the basket on `x`, clamped so it stays on the field
    pub fn move_basket(&mut self, x: f32) {
        let half = self.basket.width / 2.0;
        let (lo, hi) = (half, self.field.width - half);
        self.basket.x = if lo <= hi {
            x.clamp(lo, hi)
        } else {
            self.field.width / 2.0
        };
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.particles.tick();
        if self.phase != Phase::Playing {
            return;
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= self.config.spawn_interval {
            self.spawn_timer = 0;
            self.spawn();
        }

        let items = std::mem::take(&mut self.items);
        let mut kept = Vec::with_capacity(items.len());
        for mut item in items {
            // A terminal transition froze the board
            if self.phase != Phase::Playing {
                kept.push(item);
                continue;
            }
            item.pos.y += item.speed;
            item.rotation += FALLING_SPIN;

            if item.pos.y > self.field.height + item.radius {
                continue;
            }
            if circle_hits_box(item.pos, item.radius, self.basket.min(), self.basket.max()) {
                self.catch(&item);
                continue;
            }
            kept.push(item);
        }
        self.items = kept;
    }

    fn spawn(&mut self) {
        let radius = FALLING_RADIUS;
        let span = (self.field.width - 2.0 * radius).max(0.0);
        let pos = Vec2::new(radius + self.rng.random::<f32>() * span, -radius);

        let item = if self.rng.random_bool(self.config.hazard_chance) {
            FallingItem {
                kind: FallingKind::Hazard,
                pos,
                radius,
                speed: self.config.speed_scale * tuning::HAZARD_SPEED_FACTOR,
                rotation: 0.0,
            }
        } else {
            let target = self.question.answer();
            let value = if self.rng.random_bool(tuning::CORRECT_SPAWN_CHANCE) {
                target
            } else {
                // Uniform over 1..=MAX_ANSWER without the target
                let v = self.rng.random_range(1..MAX_ANSWER);
                if v >= target { v + 1 } else { v }
            };
            let (lo, hi) = tuning::VALUE_SPEED_JITTER;
            FallingItem {
                kind: FallingKind::Value(value),
                pos,
                radius,
                speed: self.config.speed_scale * self.rng.random_range(lo..hi),
                rotation: self.rng.random::<f32>() * std::f32::consts::TAU,
            }
        };
        log::trace!("Spawned {:?}", item.kind);
        self.items.push(item);
    }

    fn catch(&mut self, item: &FallingItem) {
        let target = self.question.answer();
        match item.kind {
            FallingKind::Hazard => {
                self.burst(item.pos, HAZARD_COLOR);
                self.game_over();
                return;
            }
            FallingKind::Value(v) if v == target => {
                self.services.play(Cue::Pop);
                self.score += POINTS_PER_HIT;
                self.progress += 1;
                self.burst(item.pos, CORRECT_COLOR);
                self.generate_question();
            }
            FallingKind::Value(_) => {
                self.services.play(Cue::Lose);
                self.burst(item.pos, WRONG_COLOR);
                self.lives = self.lives.saturating_sub(1);
            }
        }
        self.services.record(GameId::Catcher, self.level, self.score);

        if self.progress >= self.goal {
            self.win();
        } else if self.lives == 0 {
            self.game_over();
        }
    }

    fn burst(&mut self, pos: Vec2, color: [f32; 4]) {
        self.particles.burst(
            &mut self.rng,
            pos,
            CATCH_PARTICLES,
            CATCH_PARTICLE_LIFE,
            color,
            (4.0, 4.0),
        );
    }

    fn win(&mut self) {
        self.phase = Phase::LevelUp;
        self.services.play(Cue::Win);
        self.services.record(GameId::Catcher, self.level + 1, self.score);
        log::info!("Catcher level {} passed, score {}", self.level, self.score);
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.services.play(Cue::Lose);
        log::info!("Catcher game over at level {}, score {}", self.level, self.score);
    }

    /// Dismiss the banner: next level after a win, same level after a loss
    pub fn acknowledge(&mut self) {
        match self.phase {
            Phase::LevelUp => self.init_level(self.level + 1),
            Phase::GameOver => self.init_level(self.level),
            Phase::Idle | Phase::Playing => {}
        }
    }

    pub fn banner(&self) -> Option<Banner> {
        match self.phase {
            Phase::LevelUp => Some(Banner::new(
                "太棒了！",
                format!("通过了第 {} 关！", self.level + 1),
                "下一关",
            )),
            Phase::GameOver => Some(Banner::new("嘭！游戏结束", "小心炸弹哦！", "重玩")),
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

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    pub fn question(&self) -> Equation {
        self.question
    }

    pub fn basket(&self) -> &Basket {
        &self.basket
    }

    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn field(&self) -> Field {
        self.field
    }
}
