//! Cosmetic particle bursts

use glam::Vec2;
use rand::Rng;

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frames left to live
    pub life: u32,
    pub color: [f32; 4],
    pub radius: f32,
}

/// Particles owned by one simulation
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Added to each particle's vertical velocity every frame
    gravity: f32,
    /// Oldest particles are dropped past this count
    cap: usize,
}

impl ParticleSystem {
    pub fn new(gravity: f32, cap: usize) -> Self {
        Self {
            particles: Vec::new(),
            gravity,
            cap,
        }
    }

    /// Emit `count` particles from `pos` with random velocity in ±5 px/frame
    pub fn burst<R: Rng>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        count: usize,
        life: u32,
        color: [f32; 4],
        radius: (f32, f32),
    ) {
        if self.cap == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= self.cap {
                self.particles.remove(0);
            }
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 10.0,
                (rng.random::<f32>() - 0.5) * 10.0,
            );
            let radius = radius.0 + rng.random::<f32>() * (radius.1 - radius.0);
            self.particles.push(Particle {
                pos,
                vel,
                life,
                color,
                radius,
            });
        }
    }

    /// Advance one frame and drop expired particles
    pub fn tick(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y += self.gravity;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
