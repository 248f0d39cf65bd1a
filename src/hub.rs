//! Game hub: screen navigation and dispatch to the active game
//!
//! Only one game runs at a time. Games are created lazily the first time
//! they are opened and kept around afterwards, stopped while hidden.

use crate::audio::Cue;
use crate::consts::*;
use crate::persistence::{GameId, GameProgress, ProgressStore};
use crate::platform::input::{
    BubbleAction, CatcherAction, MemoryAction, PointerEvent, bubble_actions, catcher_action,
    memory_action,
};
use crate::renderer::{Draw, Scene};
use crate::sim::{Banner, BubbleGame, CatcherGame, Field, MemoryGame, Phase, Services};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Hub,
    Bubble,
    Memory,
    Catcher,
}

/// The three games reachable from the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Bubble,
    Memory,
    Catcher,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Bubble, GameKind::Memory, GameKind::Catcher];

    pub fn id(self) -> GameId {
        match self {
            GameKind::Bubble => GameId::Bubble,
            GameKind::Memory => GameId::Memory,
            GameKind::Catcher => GameId::Catcher,
        }
    }

    pub fn screen(self) -> Screen {
        match self {
            GameKind::Bubble => Screen::Bubble,
            GameKind::Memory => Screen::Memory,
            GameKind::Catcher => Screen::Catcher,
        }
    }
}

/// Heads-up values for the active game
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hud {
    pub score: u64,
    pub level: u32,
    /// Catcher question text
    pub question: Option<String>,
    pub lives: Option<u8>,
    /// Catcher (progress, goal)
    pub goal: Option<(u32, u32)>,
}

pub struct GameHub {
    screen: Screen,
    services: Services,
    seed: u64,
    bubble: Option<BubbleGame>,
    memory: Option<MemoryGame>,
    catcher: Option<CatcherGame>,
    /// Unsimulated time in milliseconds
    accumulator: f64,
    scene: Scene,
}

impl GameHub {
    pub fn new(services: Services, seed: u64) -> Self {
        Self {
            screen: Screen::Hub,
            services,
            seed,
            bubble: None,
            memory: None,
            catcher: None,
            accumulator: 0.0,
            scene: Scene::default(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Best level and score per game for the hub cards
    pub fn hub_stats(&self) -> Vec<(GameKind, GameProgress)> {
        let progress = self.services.progress.borrow();
        GameKind::ALL
            .iter()
            .map(|&kind| (kind, progress.get(kind.id())))
            .collect()
    }

    /// Switch to `kind` and start a fresh session on a `field`-sized canvas
    pub fn open(&mut self, kind: GameKind, field: Field) {
        self.services.play(Cue::Click);
        self.stop_all();
        self.accumulator = 0.0;
        let seed = self.seed.wrapping_add(kind as u64);

        match kind {
            GameKind::Bubble => {
                let game = self
                    .bubble
                    .get_or_insert_with(|| BubbleGame::new(field, self.services.clone(), seed));
                game.resize(field);
                game.start();
            }
            GameKind::Memory => {
                let game = self
                    .memory
                    .get_or_insert_with(|| MemoryGame::new(field, self.services.clone(), seed));
                game.resize(field);
                game.start();
            }
            GameKind::Catcher => {
                let game = self
                    .catcher
                    .get_or_insert_with(|| CatcherGame::new(field, self.services.clone(), seed));
                game.resize(field);
                game.start();
            }
        }
        self.screen = kind.screen();
        log::info!("Opened {:?}", kind);
    }

    /// Leave the active game and show the hub
    pub fn back_to_hub(&mut self) {
        self.services.play(Cue::Click);
        self.stop_all();
        self.screen = Screen::Hub;
    }

    fn stop_all(&mut self) {
        if let Some(game) = &mut self.bubble {
            game.stop();
        }
        if let Some(game) = &mut self.memory {
            game.stop();
        }
        if let Some(game) = &mut self.catcher {
            game.stop();
        }
    }

    /// Feed host frame time in; returns the number of fixed steps run
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        self.accumulator += dt_ms.clamp(0.0, 100.0);

        let mut substeps = 0;
        while self.accumulator >= FRAME_MS && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= FRAME_MS;
            substeps += 1;
        }
        substeps
    }

    fn step(&mut self) {
        match self.screen {
            Screen::Hub => {}
            Screen::Bubble => {
                if let Some(game) = &mut self.bubble {
                    game.tick();
                }
            }
            Screen::Memory => {
                if let Some(game) = &mut self.memory {
                    game.tick(FRAME_MS);
                }
            }
            Screen::Catcher => {
                if let Some(game) = &mut self.catcher {
                    game.tick();
                }
            }
        }
    }

    /// Route a pointer event to the active game
    pub fn pointer(&mut self, event: PointerEvent) {
        match self.screen {
            Screen::Hub => {}
            Screen::Bubble => {
                let Some(game) = &mut self.bubble else { return };
                for action in bubble_actions(event) {
                    match action {
                        BubbleAction::Aim(target) => game.aim_at(target),
                        BubbleAction::Fire => game.fire(),
                    }
                }
            }
            Screen::Memory => {
                let Some(game) = &mut self.memory else { return };
                if let Some(MemoryAction::Pick(pos)) = memory_action(event) {
                    if let Some(index) = game.card_at(pos) {
                        game.flip(index);
                    }
                }
            }
            Screen::Catcher => {
                let Some(game) = &mut self.catcher else { return };
                if game.phase() != Phase::Playing {
                    return;
                }
                if let Some(CatcherAction::MoveBasket(x)) = catcher_action(event) {
                    game.move_basket(x);
                }
            }
        }
    }

    /// Press the banner button of the active game
    pub fn acknowledge(&mut self) {
        if self.banner().is_none() {
            return;
        }
        self.services.play(Cue::Click);
        match self.screen {
            Screen::Hub => {}
            Screen::Bubble => self.bubble.iter_mut().for_each(BubbleGame::acknowledge),
            Screen::Memory => self.memory.iter_mut().for_each(MemoryGame::acknowledge),
            Screen::Catcher => self.catcher.iter_mut().for_each(CatcherGame::acknowledge),
        }
    }

    pub fn banner(&self) -> Option<Banner> {
        match self.screen {
            Screen::Hub => None,
            Screen::Bubble => self.bubble.as_ref().and_then(BubbleGame::banner),
            Screen::Memory => self.memory.as_ref().and_then(MemoryGame::banner),
            Screen::Catcher => self.catcher.as_ref().and_then(CatcherGame::banner),
        }
    }

    pub fn hud(&self) -> Option<Hud> {
        match self.screen {
            Screen::Hub => None,
            Screen::Bubble => self.bubble.as_ref().map(|g| Hud {
                score: g.score(),
                level: g.level(),
                ..Hud::default()
            }),
            Screen::Memory => self.memory.as_ref().map(|g| Hud {
                score: g.score(),
                level: g.level(),
                ..Hud::default()
            }),
            Screen::Catcher => self.catcher.as_ref().map(|g| Hud {
                score: g.score(),
                level: g.level(),
                question: Some(g.question().question()),
                lives: Some(g.lives()),
                goal: Some((g.progress(), g.goal())),
            }),
        }
    }

    /// New canvas size for the active game
    pub fn resize(&mut self, field: Field) {
        match self.screen {
            Screen::Hub => {}
            Screen::Bubble => self.bubble.iter_mut().for_each(|g| g.resize(field)),
            Screen::Memory => self.memory.iter_mut().for_each(|g| g.resize(field)),
            Screen::Catcher => self.catcher.iter_mut().for_each(|g| g.resize(field)),
        }
    }

    /// Build the active game's frame
    pub fn draw(&mut self) -> Option<&Scene> {
        let game: &dyn Draw = match self.screen {
            Screen::Hub => return None,
            Screen::Bubble => self.bubble.as_ref()?,
            Screen::Memory => self.memory.as_ref()?,
            Screen::Catcher => self.catcher.as_ref()?,
        };
        game.draw(&mut self.scene);
        Some(&self.scene)
    }

    pub fn bubble(&self) -> Option<&BubbleGame> {
        self.bubble.as_ref()
    }

    pub fn memory(&self) -> Option<&MemoryGame> {
        self.memory.as_ref()
    }

    pub fn catcher(&self) -> Option<&CatcherGame> {
        self.catcher.as_ref()
    }
}
