//! Memory card game: pair each `a+b` card with the card showing its answer.
//!
//! Delays (match confirm, flip back, win announce, deal) run on a virtual
//! millisecond clock advanced by [`MemoryGame::tick`], so tests can step
//! through them without waiting.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::equation::Equation;
use super::{Banner, Field, Services};
use crate::audio::Cue;
use crate::consts::*;
use crate::persistence::GameId;
use crate::tuning;

/// Emoji shared by the two cards of a pair
pub const EMOJI_THEMES: [&str; 15] = [
    "🍎", "🍌", "🍇", "🍓", "🍒", "🐶", "🐱", "🐭", "🐹", "🐰", "⚽", "🏀", "⭐", "🎈", "🚗",
];

/// Space between cards and around the board
const CARD_GAP: f32 = 10.0;
/// Cards are at most this much taller than wide
const CARD_ASPECT: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Equation,
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub pair_id: usize,
    pub kind: CardKind,
    pub equation: Equation,
    pub emoji: &'static str,
    pub face: CardFace,
}

impl Card {
    pub fn value(&self) -> u8 {
        self.equation.answer()
    }

    /// Main text on the card face
    pub fn label(&self) -> String {
        match self.kind {
            CardKind::Equation => self.equation.compact(),
            CardKind::Answer => self.value().to_string(),
        }
    }

    /// Emoji counting aid shown under an answer
    pub fn visuals(&self) -> Option<String> {
        match self.kind {
            CardKind::Equation => None,
            CardKind::Answer => Some(self.emoji.repeat(self.value() as usize)),
        }
    }

    fn is_up(&self) -> bool {
        self.face != CardFace::Down
    }
}

/// Screen rectangle of a laid-out card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub min: Vec2,
    pub size: Vec2,
}

impl CardRect {
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.min + self.size;
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPhase {
    Idle,
    /// Cards are being dealt; flips are ignored
    Dealing,
    Playing,
    /// Two cards are up and input is locked
    Resolving,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    DealComplete,
    ConfirmMatch(usize, usize),
    FlipBack(usize, usize),
    AnnounceWin,
}

/// Shuffled deck of `pair_count` equation/answer pairs
pub fn generate_deck<R: Rng>(pair_count: usize, rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(pair_count * 2);
    for pair_id in 0..pair_count {
        let equation = Equation::random(MAX_ANSWER, rng);
        let emoji = EMOJI_THEMES[rng.random_range(0..EMOJI_THEMES.len())];
        for kind in [CardKind::Equation, CardKind::Answer] {
            deck.push(Card {
                pair_id,
                kind,
                equation,
                emoji,
                face: CardFace::Down,
            });
        }
    }
    deck.shuffle(rng);
    deck
}

/// Memory game simulation
pub struct MemoryGame {
    field: Field,
    phase: MemoryPhase,
    level: u32,
    score: u64,
    cards: Vec<Card>,
    /// Face-up cards waiting for a partner
    flipped: Vec<usize>,
    matched_pairs: usize,
    total_pairs: usize,
    /// Virtual time in milliseconds
    clock_ms: f64,
    pending: Option<(f64, Transition)>,
    rng: Pcg32,
    services: Services,
}

impl MemoryGame {
    pub fn new(field: Field, services: Services, seed: u64) -> Self {
        Self {
            field,
            phase: MemoryPhase::Idle,
            level: 1,
            score: 0,
            cards: Vec::new(),
            flipped: Vec::with_capacity(2),
            matched_pairs: 0,
            total_pairs: 0,
            clock_ms: 0.0,
            pending: None,
            rng: Pcg32::seed_from_u64(seed),
            services,
        }
    }

    /// Start a new session at level 1
    pub fn start(&mut self) {
        self.score = 0;
        self.init_level(1);
    }

    /// Clear the board and drop pending transitions
    pub fn stop(&mut self) {
        self.phase = MemoryPhase::Idle;
        self.cards.clear();
        self.flipped.clear();
        self.pending = None;
    }

    pub fn resize(&mut self, field: Field) {
        self.field = field;
    }

    /// Deal a fresh board for `level`, discarding any transition in flight
    pub fn init_level(&mut self, level: u32) {
        let level = level.max(1);
        self.level = level;
        self.pending = None;
        self.flipped.clear();
        self.matched_pairs = 0;
        self.services.record(GameId::Memory, level, self.score);

        self.total_pairs = tuning::memory_pair_count(level);
        self.cards = generate_deck(self.total_pairs, &mut self.rng);
        self.phase = MemoryPhase::Dealing;
        self.schedule(DEAL_DELAY_MS, Transition::DealComplete);
        log::info!("Memory level {} ({} pairs)", level, self.total_pairs);
    }

    fn schedule(&mut self, delay_ms: f64, transition: Transition) {
        debug_assert!(self.pending.is_none(), "transition already pending");
        self.pending = Some((self.clock_ms + delay_ms, transition));
    }

    /// Turn a card face up
    ///
    /// Ignored while locked, for out-of-range indices and for cards already
    /// face up or matched. The second card triggers pair resolution.
    pub fn flip(&mut self, index: usize) {
        if self.phase != MemoryPhase::Playing {
            return;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return;
        };
        if card.is_up() {
            return;
        }

        card.face = CardFace::Up;
        self.services.play(Cue::Flip);
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            self.resolve_pair();
        }
    }

    fn resolve_pair(&mut self) {
        self.phase = MemoryPhase::Resolving;
        let (first, second) = (self.flipped[0], self.flipped[1]);
        if self.cards[first].pair_id == self.cards[second].pair_id {
            self.schedule(MATCH_DELAY_MS, Transition::ConfirmMatch(first, second));
        } else {
            self.schedule(MISMATCH_DELAY_MS, Transition::FlipBack(first, second));
        }
    }

    /// Advance the virtual clock, firing every transition that falls due
    pub fn tick(&mut self, dt_ms: f64) {
        if self.phase == MemoryPhase::Idle {
            return;
        }
        self.clock_ms += dt_ms;
        while let Some((due, transition)) = self.pending {
            if due > self.clock_ms {
                break;
            }
            self.pending = None;
            self.apply(transition);
        }
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::DealComplete => self.phase = MemoryPhase::Playing,
            Transition::ConfirmMatch(a, b) => {
                self.services.play(Cue::Match);
                self.cards[a].face = CardFace::Matched;
                self.cards[b].face = CardFace::Matched;
                self.flipped.clear();
                self.matched_pairs += 1;
                self.score += POINTS_PER_HIT;
                self.services.record(GameId::Memory, self.level, self.score);

                if self.matched_pairs == self.total_pairs {
                    self.schedule(WIN_DELAY_MS, Transition::AnnounceWin);
                } else {
                    self.phase = MemoryPhase::Playing;
                }
            }
            Transition::FlipBack(a, b) => {
                self.cards[a].face = CardFace::Down;
                self.cards[b].face = CardFace::Down;
                self.flipped.clear();
                self.phase = MemoryPhase::Playing;
            }
            Transition::AnnounceWin => {
                self.phase = MemoryPhase::Won;
                self.services.play(Cue::Win);
                self.services.record(GameId::Memory, self.level + 1, self.score);
                log::info!("Memory level {} cleared, score {}", self.level, self.score);
            }
        }
    }

    /// Deal the next level after a win
    pub fn acknowledge(&mut self) {
        if self.phase == MemoryPhase::Won {
            self.init_level(self.level + 1);
        }
    }

    pub fn banner(&self) -> Option<Banner> {
        (self.phase == MemoryPhase::Won).then(|| {
            Banner::new("太棒了！", format!("完成了第 {} 关！", self.level), "下一关")
        })
    }

    /// Board grid as (columns, rows)
    pub fn board_size(&self) -> (usize, usize) {
        let cols = tuning::memory_columns(self.total_pairs);
        (cols, self.cards.len().div_ceil(cols))
    }

    /// Where card `index` sits on the field
    pub fn card_rect(&self, index: usize) -> Option<CardRect> {
        if index >= self.cards.len() {
            return None;
        }
        let (cols, rows) = self.board_size();
        let (colsf, rowsf) = (cols as f32, rows as f32);

        let width = ((self.field.width - CARD_GAP * (colsf + 1.0)) / colsf).max(1.0);
        let fit_height = ((self.field.height - CARD_GAP * (rowsf + 1.0)) / rowsf).max(1.0);
        let height = fit_height.min(width * CARD_ASPECT);

        let board_height = rowsf * height + (rowsf - 1.0) * CARD_GAP;
        let top = ((self.field.height - board_height) / 2.0).max(CARD_GAP);

        let (row, col) = (index / cols, index % cols);
        Some(CardRect {
            min: Vec2::new(
                CARD_GAP + col as f32 * (width + CARD_GAP),
                top + row as f32 * (height + CARD_GAP),
            ),
            size: Vec2::new(width, height),
        })
    }

    /// Card under a field position
    pub fn card_at(&self, pos: Vec2) -> Option<usize> {
        (0..self.cards.len()).find(|&i| self.card_rect(i).is_some_and(|r| r.contains(pos)))
    }

    pub fn phase(&self) -> MemoryPhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase != MemoryPhase::Playing
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    pub fn field(&self) -> Field {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::ProgressStore;
    use crate::sim::testing::{Harness, harness};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const FIELD: Field = Field::new(480.0, 640.0);

    fn dealt(seed: u64) -> (Harness, MemoryGame) {
        let h = harness();
        let mut game = MemoryGame::new(FIELD, h.services.clone(), seed);
        game.start();
        game.tick(DEAL_DELAY_MS);
        (h, game)
    }

    fn pair_indices(game: &MemoryGame, pair_id: usize) -> (usize, usize) {
        let found: Vec<usize> = (0..game.cards().len())
            .filter(|&i| game.cards()[i].pair_id == pair_id)
            .collect();
        (found[0], found[1])
    }

    fn mismatched(game: &MemoryGame) -> (usize, usize) {
        let first = pair_indices(game, 0).0;
        let second = pair_indices(game, 1).0;
        (first, second)
    }

    #[test]
    fn test_dealing_blocks_flips() {
        let h = harness();
        let mut game = MemoryGame::new(FIELD, h.services.clone(), 1);
        game.start();
        assert_eq!(game.phase(), MemoryPhase::Dealing);
        assert_eq!(game.cards().len(), 6);

        game.flip(0);
        assert_eq!(game.cards()[0].face, CardFace::Down);

        game.tick(DEAL_DELAY_MS - 1.0);
        assert_eq!(game.phase(), MemoryPhase::Dealing);
        game.tick(1.0);
        assert_eq!(game.phase(), MemoryPhase::Playing);
        assert_eq!(h.book.borrow().get(GameId::Memory).max_level, 1);
    }

    #[test]
    fn test_matching_pair_confirms_after_delay() {
        let (h, mut game) = dealt(2);
        let (a, b) = pair_indices(&game, 0);
        game.flip(a);
        game.flip(b);
        assert_eq!(game.phase(), MemoryPhase::Resolving);
        assert_eq!(h.cues.count(Cue::Flip), 2);

        game.tick(MATCH_DELAY_MS - 1.0);
        assert_eq!(game.cards()[a].face, CardFace::Up);
        assert_eq!(game.score(), 0);

        game.tick(1.0);
        assert_eq!(game.cards()[a].face, CardFace::Matched);
        assert_eq!(game.cards()[b].face, CardFace::Matched);
        assert_eq!(game.score(), 10);
        assert_eq!(game.matched_pairs(), 1);
        assert_eq!(game.phase(), MemoryPhase::Playing);
        assert_eq!(h.cues.count(Cue::Match), 1);
        assert_eq!(h.book.borrow().get(GameId::Memory).high_score, 10);

        // Matched cards stay put
        game.flip(a);
        assert_eq!(h.cues.count(Cue::Flip), 2);
    }

    #[test]
    fn test_mismatch_flips_back() {
        let (_h, mut game) = dealt(3);
        let (a, b) = mismatched(&game);
        game.flip(a);
        game.flip(b);

        game.tick(MISMATCH_DELAY_MS - 1.0);
        assert_eq!(game.cards()[a].face, CardFace::Up);
        assert!(game.is_locked());

        game.tick(1.0);
        assert_eq!(game.cards()[a].face, CardFace::Down);
        assert_eq!(game.cards()[b].face, CardFace::Down);
        assert_eq!(game.score(), 0);
        assert!(!game.is_locked());
    }

    #[test]
    fn test_lock_rejects_third_flip() {
        let (h, mut game) = dealt(4);
        let (a, b) = mismatched(&game);
        let c = pair_indices(&game, 2).0;
        game.flip(a);
        game.flip(a);
        assert_eq!(h.cues.count(Cue::Flip), 1);
        game.flip(b);
        game.flip(c);
        assert_eq!(game.cards()[c].face, CardFace::Down);
        assert_eq!(h.cues.count(Cue::Flip), 2);

        game.flip(usize::MAX);
        assert_eq!(h.cues.count(Cue::Flip), 2);
    }

    #[test]
    fn test_clearing_board_wins() {
        let (h, mut game) = dealt(5);
        for pair in 0..game.total_pairs() {
            let (a, b) = pair_indices(&game, pair);
            game.flip(a);
            game.flip(b);
            game.tick(MATCH_DELAY_MS);
        }
        assert_eq!(game.phase(), MemoryPhase::Resolving);
        assert_eq!(h.cues.count(Cue::Win), 0);

        game.tick(WIN_DELAY_MS);
        assert_eq!(game.phase(), MemoryPhase::Won);
        assert_eq!(game.score(), 30);
        assert_eq!(h.cues.count(Cue::Win), 1);
        assert_eq!(game.banner().unwrap().button, "下一关");
        assert_eq!(h.book.borrow().get(GameId::Memory).max_level, 2);

        game.acknowledge();
        assert_eq!(game.level(), 2);
        assert_eq!(game.cards().len(), 12);
        assert_eq!(game.score(), 30);
        assert_eq!(game.phase(), MemoryPhase::Dealing);
    }

    #[test]
    fn test_long_frame_fires_chained_transitions() {
        let (h, mut game) = dealt(6);
        // Leave one pair, then resolve it with a single large step
        for pair in 0..game.total_pairs() {
            let (a, b) = pair_indices(&game, pair);
            game.flip(a);
            game.flip(b);
            if pair + 1 < game.total_pairs() {
                game.tick(MATCH_DELAY_MS);
            }
        }
        game.tick(MATCH_DELAY_MS + WIN_DELAY_MS);
        assert_eq!(game.phase(), MemoryPhase::Won);
        assert_eq!(h.cues.count(Cue::Match), 3);
    }

    #[test]
    fn test_stop_discards_pending() {
        let (h, mut game) = dealt(7);
        let (a, b) = pair_indices(&game, 0);
        game.flip(a);
        game.flip(b);
        game.stop();
        game.tick(5_000.0);
        assert!(game.cards().is_empty());
        assert_eq!(h.cues.count(Cue::Match), 0);
        assert_eq!(game.phase(), MemoryPhase::Idle);
    }

    #[test]
    fn test_restart_while_resolving_deals_fresh_board() {
        let (h, mut game) = dealt(9);
        let (a, b) = pair_indices(&game, 0);
        game.flip(a);
        game.flip(b);
        assert_eq!(game.phase(), MemoryPhase::Resolving);

        game.start();
        assert_eq!(game.phase(), MemoryPhase::Dealing);
        assert!(game.cards().iter().all(|c| c.face == CardFace::Down));

        // The stale match confirmation never fires
        game.tick(5_000.0);
        assert_eq!(h.cues.count(Cue::Match), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), MemoryPhase::Playing);
    }

    #[test]
    fn test_layout_hit_testing() {
        let (_h, mut game) = dealt(8);
        assert_eq!(game.board_size(), (3, 2));
        for i in 0..game.cards().len() {
            let rect = game.card_rect(i).unwrap();
            assert_eq!(game.card_at(rect.center()), Some(i));
            assert!(rect.min.x >= 0.0 && rect.min.x + rect.size.x <= FIELD.width);
            assert!(rect.min.y >= 0.0 && rect.min.y + rect.size.y <= FIELD.height);
        }
        assert_eq!(game.card_at(Vec2::new(1.0, 1.0)), None);
        assert_eq!(game.card_rect(6), None);

        game.init_level(4);
        assert_eq!(game.board_size(), (4, 5));
        let last = game.card_rect(19).unwrap();
        assert!(last.min.y + last.size.y <= FIELD.height);
    }

    #[test]
    fn test_answer_card_text() {
        let card = Card {
            pair_id: 0,
            kind: CardKind::Answer,
            equation: Equation { a: 1, b: 2 },
            emoji: "🍎",
            face: CardFace::Down,
        };
        assert_eq!(card.label(), "3");
        assert_eq!(card.visuals().as_deref(), Some("🍎🍎🍎"));

        let eq = Card { kind: CardKind::Equation, ..card };
        assert_eq!(eq.label(), "1+2");
        assert_eq!(eq.visuals(), None);
    }

    proptest! {
        #[test]
        fn prop_deck_structure(pairs in 1usize..12, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let deck = generate_deck(pairs, &mut rng);
            prop_assert_eq!(deck.len(), pairs * 2);

            let mut by_pair: BTreeMap<usize, Vec<&Card>> = BTreeMap::new();
            for card in &deck {
                by_pair.entry(card.pair_id).or_default().push(card);
            }
            prop_assert_eq!(by_pair.len(), pairs);
            for cards in by_pair.values() {
                prop_assert_eq!(cards.len(), 2);
                prop_assert_ne!(cards[0].kind, cards[1].kind);
                prop_assert_eq!(cards[0].emoji, cards[1].emoji);
                prop_assert_eq!(cards[0].value(), cards[1].value());
                prop_assert!((1..=MAX_ANSWER).contains(&cards[0].value()));
                prop_assert_eq!(cards[0].face, CardFace::Down);
            }
        }
    }
}
