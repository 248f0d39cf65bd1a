//! Scene generation for each game
//!
//! Reads simulation state only; called once per frame after the update.

use glam::Vec2;

use super::Draw;
use super::scene::{Scene, colors};
use crate::sim::{
    BubbleGame, CardFace, CardKind, CatcherGame, FallingKind, MemoryGame, ParticleSystem,
};
use crate::value_color;

/// Length of the dashed aim guide
const AIM_GUIDE_LENGTH: f32 = 100.0;
/// Catcher particles are drawn at a fixed size
const CATCH_PARTICLE_RADIUS: f32 = 4.0;

/// Numbered bubble with shadow and highlight
pub fn bubble(scene: &mut Scene, center: Vec2, tile_radius: f32, value: u8, label: &str) {
    let r = (tile_radius - 2.0).max(1.0);
    scene.circle(center + Vec2::new(0.0, 4.0), r, colors::SHADOW);
    scene.circle(center, r, value_color(value));
    scene.circle(center - Vec2::splat(r * 0.35), r * 0.22, colors::SHINE);
    scene.text(center, label, 18.0, colors::WHITE, true);
}

/// Basket trapezoid with its rim, anchored at the top-centre
pub fn basket(scene: &mut Scene, top_center: Vec2, width: f32, height: f32) {
    let half = width / 2.0;
    scene.polygon(
        vec![
            top_center + Vec2::new(-half, 0.0),
            top_center + Vec2::new(half, 0.0),
            top_center + Vec2::new(half - 10.0, height),
            top_center + Vec2::new(-half + 10.0, height),
        ],
        colors::BASKET,
    );
    scene.rect(
        top_center + Vec2::new(-half - 5.0, -5.0),
        Vec2::new(width + 10.0, 10.0),
        colors::BASKET_RIM,
        0.0,
    );
}

/// Stem offset for an apple turned by `rotation`
fn stem_tip(center: Vec2, radius: f32, rotation: f32) -> (Vec2, Vec2) {
    let dir = Vec2::from_angle(rotation).rotate(Vec2::NEG_Y);
    (center + dir * (radius - 3.0), center + dir * (radius + 5.0))
}

fn particles(scene: &mut Scene, system: &ParticleSystem, fixed_radius: Option<f32>) {
    for p in system.iter() {
        scene.circle(p.pos, fixed_radius.unwrap_or(p.radius), p.color);
    }
}

impl Draw for BubbleGame {
    fn draw(&self, scene: &mut Scene) {
        let field = self.field();
        scene.clear(field.width, field.height);
        let geometry = self.geometry();

        for (cell, value) in self.grid().occupied() {
            bubble(scene, geometry.cell_center(cell), geometry.tile_radius, value, &value.to_string());
        }
        particles(scene, self.particles(), None);

        let launcher = self.launcher_pos();
        let guide = launcher + Vec2::from_angle(self.aim_angle()) * AIM_GUIDE_LENGTH;
        scene.line(launcher, guide, 5.0, colors::AIM_GUIDE, Some(10.0));

        if let Some(p) = self.projectile() {
            bubble(scene, p.pos, geometry.tile_radius, p.value, &p.equation.compact());
        } else if let Some(next) = self.next_bubble() {
            bubble(scene, launcher, geometry.tile_radius, next.value, &next.equation.compact());
        }
    }
}

impl Draw for MemoryGame {
    fn draw(&self, scene: &mut Scene) {
        let field = self.field();
        scene.clear(field.width, field.height);

        for (i, card) in self.cards().iter().enumerate() {
            let Some(rect) = self.card_rect(i) else { continue };
            let center = rect.center();
            if card.face == CardFace::Down {
                scene.rect(rect.min, rect.size, colors::CARD_BACK, 10.0);
                scene.text(center, "?", rect.size.x * 0.4, colors::WHITE, true);
                continue;
            }

            let face = match card.kind {
                CardKind::Equation => colors::CARD_EQUATION,
                CardKind::Answer => colors::CARD_ANSWER,
            };
            scene.rect(rect.min, rect.size, face, 10.0);
            if card.face == CardFace::Matched {
                scene.rect(rect.min, rect.size, colors::CARD_MATCHED, 10.0);
            }

            let text_size = (rect.size.x * 0.28).min(32.0);
            match card.visuals() {
                Some(emoji) => {
                    scene.text(
                        center - Vec2::new(0.0, rect.size.y * 0.18),
                        card.label(),
                        text_size,
                        colors::CARD_TEXT,
                        true,
                    );
                    scene.text(
                        center + Vec2::new(0.0, rect.size.y * 0.22),
                        emoji,
                        (rect.size.x / 7.0).min(16.0),
                        colors::CARD_TEXT,
                        false,
                    );
                }
                None => scene.text(center, card.label(), text_size, colors::CARD_TEXT, true),
            }
        }
    }
}

impl Draw for CatcherGame {
    fn draw(&self, scene: &mut Scene) {
        let field = self.field();
        scene.clear(field.width, field.height);

        let b = self.basket();
        basket(scene, Vec2::new(b.x, b.y), b.width, b.height);

        for item in self.items() {
            match item.kind {
                FallingKind::Value(v) => {
                    scene.circle(item.pos, item.radius, colors::APPLE);
                    let shine = item.pos + Vec2::from_angle(item.rotation).rotate(Vec2::splat(-8.0));
                    scene.circle(shine, 8.0, colors::SHINE);
                    let (base, tip) = stem_tip(item.pos, item.radius, item.rotation);
                    scene.line(base, tip, 4.0, colors::STEM, None);
                    scene.text(item.pos, v.to_string(), 24.0, colors::WHITE, true);
                }
                FallingKind::Hazard => {
                    scene.circle(item.pos, item.radius, colors::BOMB);
                    scene.circle(item.pos - Vec2::splat(6.0), 6.0, colors::SHINE);
                    let fuse = item.pos - Vec2::new(0.0, item.radius);
                    scene.line(fuse, fuse + Vec2::new(10.0, -5.0), 3.0, colors::FUSE, None);
                    scene.text(item.pos + Vec2::new(0.0, 2.0), "☠️", 20.0, colors::WHITE, false);
                }
            }
        }
        particles(scene, self.particles(), Some(CATCH_PARTICLE_RADIUS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawCmd;
    use crate::sim::Field;
    use crate::sim::testing::harness;

    #[test]
    fn test_bubble_scene_has_launcher_equation() {
        let h = harness();
        let mut game = BubbleGame::new(Field::new(500.0, 700.0), h.services.clone(), 1);
        game.start();
        let mut scene = Scene::default();
        game.draw(&mut scene);

        let label = game.next_bubble().unwrap().equation.compact();
        assert!(scene.texts().any(|t| t == label));
        let dashed = scene
            .cmds()
            .iter()
            .filter(|cmd| matches!(cmd, DrawCmd::Line { dash: Some(_), .. }))
            .count();
        assert_eq!(dashed, 1);
        // One label per grid bubble plus the launcher
        assert_eq!(scene.texts().count(), game.grid().occupied_count() + 1);
    }

    #[test]
    fn test_memory_scene_hides_face_down_cards() {
        let h = harness();
        let mut game = MemoryGame::new(Field::new(480.0, 640.0), h.services.clone(), 2);
        game.start();
        let mut scene = Scene::default();
        game.draw(&mut scene);
        assert_eq!(scene.texts().filter(|t| *t == "?").count(), 6);
    }

    #[test]
    fn test_catcher_scene_draws_basket() {
        let h = harness();
        let mut game = CatcherGame::new(Field::new(400.0, 600.0), h.services.clone(), 3);
        game.start();
        let mut scene = Scene::default();
        game.draw(&mut scene);
        assert!(matches!(scene.cmds()[0], DrawCmd::Polygon { .. }));
        assert_eq!(scene.width, 400.0);
    }
}
