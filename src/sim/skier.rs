//! The player's skier
//!
//! Three mutually exclusive motion states:
//! - `Normal`: steerable, leans into turns
//! - `Tumbling`: crash recovery, input ignored for a fixed duration
//! - `Jumping`: half-sine arc with continuous flips
//!
//! Tumbling and Jumping can only be entered from Normal.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::platform::InputState;
use crate::smooth_damp;
use crate::tuning::SkierTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Normal,
    Tumbling,
    Jumping,
}

/// Duration and apex of the current jump
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpParams {
    pub duration: f32,
    pub height: f32,
}

impl JumpParams {
    /// Altitude `t` seconds into the jump: `height * sin(pi * t / duration)`
    pub fn height_at(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let progress = (t / self.duration).clamp(0.0, 1.0);
        self.height * (PI * progress).sin()
    }
}

/// What happened to the skier during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkierUpdate {
    /// Full rotations completed this step
    pub flips_completed: u32,
    /// Set on the step the skier lands, with the jump's flip count
    pub landed: Option<u32>,
    /// Set on the step tumbling ends
    pub recovered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skier {
    tuning: SkierTuning,
    pub position: Vec3,
    /// Euler rotation for rendering (pitch, yaw, roll)
    pub rotation: Vec3,
    /// -1 left, 1 right, 0 straight, as of the last input read
    pub lateral_intent: f32,
    lives: u32,
    state: MotionState,
    tumble_timer: f32,
    /// Spin rates about x and z while tumbling (rad/s)
    tumble_spin: Vec2,
    jump_timer: f32,
    jump: JumpParams,
    /// Game speed captured at takeoff
    jump_speed: f32,
    flip_rotation: f32,
    flip_count: u32,
    /// Jumps started since the skier was created
    jump_serial: u32,
    lean_velocity: f32,
}

impl Skier {
    pub fn new(tuning: SkierTuning) -> Self {
        let lives = tuning.starting_lives;
        Self {
            tuning,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            lateral_intent: 0.0,
            lives,
            state: MotionState::Normal,
            tumble_timer: 0.0,
            tumble_spin: Vec2::ZERO,
            jump_timer: 0.0,
            jump: JumpParams::default(),
            jump_speed: 0.0,
            flip_rotation: 0.0,
            flip_count: 0,
            jump_serial: 0,
            lean_velocity: 0.0,
        }
    }

    /// Crash. Costs a life. Refused (false) unless the skier is in Normal.
    pub fn start_tumbling<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.state != MotionState::Normal {
            return false;
        }
        self.state = MotionState::Tumbling;
        self.tumble_timer = 0.0;
        let spin = self.tuning.tumble_spin;
        self.tumble_spin = Vec2::new(
            if rng.random_bool(0.5) { spin } else { -spin },
            if rng.random_bool(0.5) { spin } else { -spin },
        );
        self.lives = self.lives.saturating_sub(1);
        true
    }

    /// Take off. Faster play gives longer, higher jumps. Refused (false)
    /// unless the skier is in Normal.
    pub fn start_jump(&mut self, speed: f32) -> bool {
        if self.state != MotionState::Normal {
            return false;
        }
        self.state = MotionState::Jumping;
        self.jump_timer = 0.0;
        self.jump_speed = speed;
        self.jump = JumpParams {
            duration: self.tuning.jump_base_duration + speed * self.tuning.jump_duration_per_speed,
            height: self.tuning.jump_base_height + speed * self.tuning.jump_height_per_speed,
        };
        self.flip_rotation = 0.0;
        self.flip_count = 0;
        self.jump_serial = self.jump_serial.wrapping_add(1);
        true
    }

    /// Hot chocolate. No upper cap.
    pub fn gain_extra_life(&mut self) -> bool {
        self.lives += 1;
        true
    }

    /// Advance one step. Input is ignored while tumbling.
    pub fn update(&mut self, input: &InputState, speed: f32, dt: f32) -> SkierUpdate {
        let mut result = SkierUpdate::default();

        match self.state {
            MotionState::Tumbling => result.recovered = self.update_tumbling(dt),
            MotionState::Jumping => self.update_jump(dt, &mut result),
            MotionState::Normal => {}
        }

        if self.state == MotionState::Tumbling {
            self.lateral_intent = 0.0;
            return result;
        }

        self.lateral_intent = match (input.left, input.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        // Lateral speed is tuned per 1/60 s
        let step = self.tuning.movement_speed * (1.0 + speed) * dt * 60.0;
        if input.left {
            self.position.x -= step;
        }
        if input.right {
            self.position.x += step;
        }
        let max = self.tuning.max_horizontal;
        self.position.x = self.position.x.clamp(-max, max);

        if self.state == MotionState::Normal {
            let target_lean = -self.lateral_intent * self.tuning.lean_angle;
            self.rotation.z = smooth_damp(
                self.rotation.z,
                target_lean,
                &mut self.lean_velocity,
                self.tuning.lean_smooth_time,
                dt,
            );
        }

        result
    }

    fn update_tumbling(&mut self, dt: f32) -> bool {
        self.tumble_timer += dt;
        if self.tumble_timer >= self.tuning.tumble_duration {
            self.state = MotionState::Normal;
            self.rotation = Vec3::ZERO;
            self.lean_velocity = 0.0;
            return true;
        }
        self.rotation.x += self.tumble_spin.x * dt;
        self.rotation.z += self.tumble_spin.y * dt;
        false
    }

    fn update_jump(&mut self, dt: f32, result: &mut SkierUpdate) {
        self.jump_timer += dt;
        self.position.y = self.jump.height_at(self.jump_timer);

        let flip_rate = TAU * (1.0 + self.jump_speed) / self.jump.duration;
        self.flip_rotation += flip_rate * dt;
        self.rotation.x = self.flip_rotation;
        while (self.flip_rotation / TAU).floor() as u32 > self.flip_count {
            self.flip_count += 1;
            result.flips_completed += 1;
        }

        if self.jump_timer >= self.jump.duration {
            self.state = MotionState::Normal;
            self.position.y = 0.0;
            self.rotation.x = 0.0;
            self.flip_rotation = 0.0;
            result.landed = Some(self.flip_count);
        }
    }

    /// Back to the start line without touching lives
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation = Vec3::ZERO;
        self.lateral_intent = 0.0;
        self.state = MotionState::Normal;
        self.tumble_timer = 0.0;
        self.tumble_spin = Vec2::ZERO;
        self.jump_timer = 0.0;
        self.jump = JumpParams::default();
        self.flip_rotation = 0.0;
        self.flip_count = 0;
        self.lean_velocity = 0.0;
    }

    pub fn reset_lives(&mut self) {
        self.lives = self.tuning.starting_lives;
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_tumbling(&self) -> bool {
        self.state == MotionState::Tumbling
    }

    pub fn is_jumping(&self) -> bool {
        self.state == MotionState::Jumping
    }

    pub fn flip_count(&self) -> u32 {
        self.flip_count
    }

    pub fn reset_flip_count(&mut self) {
        self.flip_count = 0;
    }

    pub fn jump_serial(&self) -> u32 {
        self.jump_serial
    }

    pub fn jump_params(&self) -> JumpParams {
        self.jump
    }

    /// Seconds into the current jump or tumble
    pub fn state_timer(&self) -> f32 {
        match self.state {
            MotionState::Normal => 0.0,
            MotionState::Tumbling => self.tumble_timer,
            MotionState::Jumping => self.jump_timer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn skier() -> (Skier, Pcg32) {
        (Skier::new(SkierTuning::default()), Pcg32::seed_from_u64(21))
    }

    fn left() -> InputState {
        InputState {
            left: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tumble_is_exclusive() {
        let (mut skier, mut rng) = skier();
        assert!(skier.start_tumbling(&mut rng));
        assert_eq!(skier.lives(), 2);
        assert!(!skier.start_tumbling(&mut rng));
        assert_eq!(skier.lives(), 2);
        assert!(!skier.start_jump(0.1));
    }

    #[test]
    fn test_jump_blocks_tumble() {
        let (mut skier, mut rng) = skier();
        assert!(skier.start_jump(0.1));
        assert!(!skier.start_tumbling(&mut rng));
        assert!(!skier.start_jump(0.1));
        assert_eq!(skier.lives(), 3);
    }

    #[test]
    fn test_tumble_recovers_after_duration() {
        let (mut skier, mut rng) = skier();
        skier.start_tumbling(&mut rng);
        let input = InputState::default();
        let mut recovered_at = None;
        for step in 0..60 {
            if skier.update(&input, 0.1, SIM_DT).recovered {
                recovered_at = Some(step);
                break;
            }
            assert_ne!(skier.rotation, Vec3::ZERO);
        }
        // 0.5 s at 60 Hz
        assert_eq!(recovered_at, Some(29));
        assert_eq!(skier.state(), MotionState::Normal);
        assert_eq!(skier.rotation, Vec3::ZERO);
    }

    #[test]
    fn test_input_ignored_while_tumbling() {
        let (mut skier, mut rng) = skier();
        skier.start_tumbling(&mut rng);
        skier.update(&left(), 0.1, SIM_DT);
        assert_eq!(skier.position.x, 0.0);
    }

    #[test]
    fn test_lateral_movement_and_clamp() {
        let (mut skier, _) = skier();
        skier.update(&left(), 0.0, SIM_DT);
        assert!((skier.position.x + 0.2).abs() < 1e-5);

        for _ in 0..200 {
            skier.update(&left(), 0.5, SIM_DT);
        }
        assert_eq!(skier.position.x, -8.0);
    }

    #[test]
    fn test_lean_is_smoothed() {
        let (mut skier, _) = skier();
        skier.update(&left(), 0.1, SIM_DT);
        let first = skier.rotation.z;
        assert!(first > 0.0 && first < 0.2);
        for _ in 0..120 {
            skier.update(&left(), 0.1, SIM_DT);
        }
        assert!((skier.rotation.z - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_jump_height_curve() {
        let params = JumpParams {
            duration: 0.8,
            height: 4.0,
        };
        assert_eq!(params.height_at(0.0), 0.0);
        assert!(params.height_at(0.8).abs() < 1e-5);
        assert!((params.height_at(0.4) - 4.0).abs() < 1e-5);
        assert!(params.height_at(0.1) > 0.0);
        assert!(params.height_at(0.7) > 0.0);
    }

    #[test]
    fn test_jump_scales_with_speed() {
        let (mut slow, _) = skier();
        let (mut fast, _) = skier();
        slow.start_jump(0.1);
        fast.start_jump(0.5);
        assert!(fast.jump_params().duration > slow.jump_params().duration);
        assert!(fast.jump_params().height > slow.jump_params().height);
    }

    #[test]
    fn test_jump_lands_with_one_flip() {
        let (mut skier, _) = skier();
        skier.start_jump(0.1);
        let input = InputState::default();
        let mut flips = 0;
        let mut landed = None;
        let mut peak: f32 = 0.0;
        for _ in 0..200 {
            let update = skier.update(&input, 0.1, SIM_DT);
            flips += update.flips_completed;
            peak = peak.max(skier.position.y);
            if let Some(count) = update.landed {
                landed = Some(count);
                break;
            }
        }
        assert_eq!(landed, Some(1));
        assert_eq!(flips, 1);
        assert!(peak > 3.9);
        assert_eq!(skier.position.y, 0.0);
        assert_eq!(skier.rotation.x, 0.0);
        // Count is kept until the scorer reads it
        assert_eq!(skier.flip_count(), 1);
    }

    #[test]
    fn test_steering_allowed_while_airborne() {
        let (mut skier, _) = skier();
        skier.start_jump(0.1);
        skier.update(&left(), 0.1, SIM_DT);
        assert!(skier.position.x < 0.0);
    }

    #[test]
    fn test_extra_life_uncapped() {
        let (mut skier, _) = skier();
        for _ in 0..10 {
            assert!(skier.gain_extra_life());
        }
        assert_eq!(skier.lives(), 13);
    }

    #[test]
    fn test_lives_floor_at_zero() {
        let (mut skier, mut rng) = skier();
        let input = InputState::default();
        for _ in 0..5 {
            skier.start_tumbling(&mut rng);
            for _ in 0..40 {
                skier.update(&input, 0.1, SIM_DT);
            }
        }
        assert_eq!(skier.lives(), 0);
    }

    #[test]
    fn test_reset_keeps_lives() {
        let (mut skier, mut rng) = skier();
        skier.start_tumbling(&mut rng);
        skier.position.x = 3.0;
        skier.reset();
        assert_eq!(skier.position, Vec3::ZERO);
        assert_eq!(skier.state(), MotionState::Normal);
        assert_eq!(skier.lives(), 2);
        skier.reset_lives();
        assert_eq!(skier.lives(), 3);
    }
}
