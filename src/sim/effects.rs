//! Decorative effects
//!
//! Floating point indicators, the skier's snow trail and the life-gain flash
//! all live in one list ticked by the main simulation step. Nothing here
//! feeds back into gameplay.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::SimTime;

/// Maximum concurrent point indicators
pub const MAX_INDICATORS: usize = 10;
/// Maximum live trail particles
pub const MAX_TRAIL_PARTICLES: usize = 50;
/// Indicator lifetime in seconds
pub const INDICATOR_LIFETIME: f32 = 1.0;
/// Indicator rise speed, units per second
pub const INDICATOR_RISE: f32 = 0.6;
/// Duration of the green flash after gaining a life
pub const LIFE_FLASH_DURATION: f32 = 0.3;
/// Per-step velocity damping for trail particles
const TRAIL_FRICTION: f32 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorLabel {
    Points(u64),
    ExtraLife,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointIndicator {
    pub label: IndicatorLabel,
    pub position: Vec3,
    pub age: f32,
}

impl PointIndicator {
    /// 1 when fresh, fading linearly to 0
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / INDICATOR_LIFETIME).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailParticle {
    pub position: Vec3,
    /// Units per 1/60 s
    pub velocity: Vec3,
    pub size: f32,
    pub age: f32,
    pub max_age: f32,
}

impl TrailParticle {
    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub indicators: Vec<PointIndicator>,
    pub trail: Vec<TrailParticle>,
    /// Seconds left on the life-gain flash
    pub life_flash: f32,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            indicators: Vec::with_capacity(MAX_INDICATORS),
            trail: Vec::with_capacity(MAX_TRAIL_PARTICLES),
            life_flash: 0.0,
        }
    }

    /// Float a label up from `position`. The oldest indicator gives way when
    /// the list is full.
    pub fn spawn_indicator(&mut self, label: IndicatorLabel, position: Vec3) {
        if self.indicators.len() >= MAX_INDICATORS {
            self.indicators.remove(0);
        }
        self.indicators.push(PointIndicator {
            label,
            position: position + Vec3::Y * 2.0,
            age: 0.0,
        });
    }

    pub fn flash_life(&mut self, position: Vec3) {
        self.life_flash = LIFE_FLASH_DURATION;
        self.spawn_indicator(IndicatorLabel::ExtraLife, position);
    }

    /// Advance every effect by one step. `skier` is where new trail particles
    /// spawn; pass `None` while the skier is tumbling.
    pub fn update<R: Rng>(&mut self, time: &SimTime, skier: Option<Vec3>, rng: &mut R) {
        let dt = time.dt;

        for indicator in &mut self.indicators {
            indicator.age += dt;
            indicator.position.y += INDICATOR_RISE * dt;
        }
        self.indicators.retain(|i| i.age < INDICATOR_LIFETIME);

        // About every other step at 60 Hz
        let origin = skier.filter(|_| self.trail.len() < MAX_TRAIL_PARTICLES);
        if let Some(origin) = origin.filter(|_| rng.random::<f32>() < dt * 30.0) {
            self.trail.push(TrailParticle {
                position: Vec3::new(
                    origin.x + (rng.random::<f32>() - 0.5) * 0.3,
                    0.05,
                    origin.z + (rng.random::<f32>() - 0.5) * 0.3,
                ),
                velocity: Vec3::new(
                    (rng.random::<f32>() - 0.5) * 0.01,
                    rng.random::<f32>() * 0.02 + 0.01,
                    (rng.random::<f32>() - 0.5) * 0.01,
                ),
                size: rng.random::<f32>() * 0.2 + 0.1,
                age: 0.0,
                max_age: rng.random::<f32>() * 0.5 + 0.33,
            });
        }

        for particle in &mut self.trail {
            particle.position += particle.velocity * dt * 60.0;
            particle.velocity *= TRAIL_FRICTION;
            particle.age += dt;
        }
        self.trail.retain(|p| p.age < p.max_age);

        self.life_flash = (self.life_flash - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        self.indicators.clear();
        self.trail.clear();
        self.life_flash = 0.0;
    }
}
