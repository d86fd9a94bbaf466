//! Slope Rush - An endless downhill skiing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, terrain, obstacles, skier, collisions, scoring)
//! - `session`: Session control surface and UI event callbacks
//! - `render`: Read-only snapshot of the world for a renderer
//! - `platform`: Browser input and presence adapters
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::{FrameOutcome, GameListener, LoopToken, NullListener, Session};
pub use settings::{PerformanceMode, PerformanceMonitor, QualityLevel, Settings};
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use crate::sim::Footprint;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum fixed steps per rendered frame to prevent spiral of death
    pub const MAX_STEPS_PER_FRAME: u32 = 3;
    /// Largest wall-clock delta accepted from a single frame (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Forward speed at session start (world units per fixed step)
    pub const INITIAL_SPEED: f32 = 0.1;
    /// Speed gained per second of play, scaled to the 60 Hz reference rate
    pub const SPEED_RAMP: f32 = 0.0001;

    /// Skier may not leave [-TRACK_HALF_WIDTH, TRACK_HALF_WIDTH]
    pub const TRACK_HALF_WIDTH: f32 = 8.0;
    /// Entities behind this z are recycled
    pub const RECYCLE_Z: f32 = 10.0;

    /// Collision box of the skier
    pub const SKIER_FOOTPRINT: Footprint = Footprint::new(0.4, 1.6, 0.3);

    pub const STARTING_LIVES: u32 = 3;
}

/// Move `current` toward `target` with a critically damped spring.
///
/// `velocity` carries the spring state between calls. `smooth_time` is roughly
/// the time to reach the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    target + (change + temp) * exp
}

/// Horizontal (x, z) distance between two world positions
#[inline]
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_damp_converges() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            value = smooth_damp(value, 1.0, &mut velocity, 0.1, consts::SIM_DT);
        }
        assert!((value - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_smooth_damp_does_not_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..120 {
            value = smooth_damp(value, 0.3, &mut velocity, 0.15, consts::SIM_DT);
            assert!(value <= 0.3 + 1e-4);
        }
    }

    #[test]
    fn test_ground_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, 0.0, 4.0);
        assert!((ground_distance(a, b) - 5.0).abs() < 1e-6);
    }
}
