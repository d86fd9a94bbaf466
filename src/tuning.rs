//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override it
//! from JSON without touching the simulation. `Tuning::default()` is the
//! shipped balance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Tolerance when checking that obstacle weights form a distribution
const WEIGHT_SUM_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("obstacle weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f32 },
}

/// Fixed-timestep clock and difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    /// Seconds per simulation step
    pub fixed_step: f32,
    /// Step cap per rendered frame
    pub max_steps_per_frame: u32,
    /// Clamp for one frame's wall-clock delta (seconds)
    pub max_frame_delta: f32,
    pub initial_speed: f32,
    /// Speed gained per second, expressed at the 60 Hz reference rate
    pub speed_ramp: f32,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            fixed_step: SIM_DT,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
            max_frame_delta: MAX_FRAME_DELTA,
            initial_speed: INITIAL_SPEED,
            speed_ramp: SPEED_RAMP,
        }
    }
}

/// Terrain tile ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTuning {
    pub tile_count: usize,
    pub tile_width: f32,
    pub tile_depth: f32,
    /// Height samples across the tile (x)
    pub samples_x: usize,
    /// Height samples along the tile (z)
    pub samples_z: usize,
    pub recycle_z: f32,
    pub roughness_min: f32,
    pub roughness_max: f32,
    /// How far the slope edges rise above the centerline
    pub valley_lift: f32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            tile_count: 10,
            tile_width: 20.0,
            tile_depth: 20.0,
            samples_x: 11,
            samples_z: 11,
            recycle_z: RECYCLE_Z,
            roughness_min: 0.5,
            roughness_max: 1.0,
            valley_lift: 1.5,
        }
    }
}

/// Relative frequency of each obstacle category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleWeights {
    pub tree: f32,
    pub jump_ramp: f32,
    pub banner_jump: f32,
    pub pickup: f32,
    pub rock: f32,
}

impl Default for ObstacleWeights {
    fn default() -> Self {
        Self {
            tree: 0.40,
            jump_ramp: 0.15,
            banner_jump: 0.05,
            pickup: 0.05,
            rock: 0.35,
        }
    }
}

impl ObstacleWeights {
    pub fn sum(&self) -> f32 {
        self.tree + self.jump_ramp + self.banner_jump + self.pickup + self.rock
    }
}

/// Obstacle pool and spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub max_obstacles: usize,
    /// Distance ahead of the skier where replacements spawn
    pub spawn_range: f32,
    /// Random extra depth added to each spawn
    pub spawn_jitter: f32,
    /// Closest spawn distance when the pool is first filled
    pub first_spawn_offset: f32,
    pub recycle_z: f32,
    /// Hazards and jumps spawn within [-half_width, half_width)
    pub spawn_half_width: f32,
    /// Narrower lane for pickups so they stay reachable
    pub pickup_half_width: f32,
    /// Number of distinct banner artworks for banner jumps
    pub banner_brands: u8,
    pub weights: ObstacleWeights,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            max_obstacles: 50,
            spawn_range: 100.0,
            spawn_jitter: 5.0,
            first_spawn_offset: 10.0,
            recycle_z: RECYCLE_Z,
            spawn_half_width: TRACK_HALF_WIDTH,
            pickup_half_width: 5.0,
            banner_brands: 4,
            weights: ObstacleWeights::default(),
        }
    }
}

/// Trackside fences and their banner advertisements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FenceTuning {
    /// Fence sections per side of the track
    pub sections_per_side: usize,
    pub section_length: f32,
    /// Distance of the fence line from the track center
    pub track_offset: f32,
    /// Probability that a freshly placed section carries a banner
    pub banner_chance: f32,
    /// Banner pool size
    pub max_visible_banners: usize,
    pub banner_images: u8,
    pub recycle_z: f32,
}

impl Default for FenceTuning {
    fn default() -> Self {
        Self {
            sections_per_side: 20,
            section_length: 6.0,
            track_offset: 10.5,
            banner_chance: 0.25,
            max_visible_banners: 6,
            banner_images: 4,
            recycle_z: RECYCLE_Z,
        }
    }
}

/// Skier movement and animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkierTuning {
    /// Lateral units per 1/60 s at zero speed
    pub movement_speed: f32,
    pub max_horizontal: f32,
    pub starting_lives: u32,
    /// Seconds spent tumbling after a crash
    pub tumble_duration: f32,
    /// Tumble spin magnitude per axis (rad/s)
    pub tumble_spin: f32,
    pub jump_base_duration: f32,
    pub jump_duration_per_speed: f32,
    pub jump_base_height: f32,
    pub jump_height_per_speed: f32,
    /// Lean angle while turning (radians)
    pub lean_angle: f32,
    pub lean_smooth_time: f32,
}

impl Default for SkierTuning {
    fn default() -> Self {
        Self {
            movement_speed: 0.2,
            max_horizontal: TRACK_HALF_WIDTH,
            starting_lives: STARTING_LIVES,
            tumble_duration: 0.5,
            tumble_spin: 0.4 * 60.0,
            jump_base_duration: 0.67,
            jump_duration_per_speed: 1.67,
            jump_base_height: 3.0,
            jump_height_per_speed: 10.0,
            lean_angle: 0.2,
            lean_smooth_time: 0.12,
        }
    }
}

/// Point values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub jump_ramp_bonus: u64,
    pub banner_jump_bonus: u64,
    pub points_per_flip: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            jump_ramp_bonus: 10,
            banner_jump_bonus: 25,
            points_per_flip: 50,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub clock: ClockTuning,
    pub terrain: TerrainTuning,
    pub obstacles: ObstacleTuning,
    pub fences: FenceTuning,
    pub skier: SkierTuning,
    pub scoring: ScoringTuning,
}

fn require(ok: bool, field: &'static str, expected: &'static str, value: f64) -> Result<(), TuningError> {
    if ok {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}

impl Tuning {
    /// Parse and validate a tuning document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the simulation's invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let c = &self.clock;
        require(
            c.fixed_step.is_finite() && c.fixed_step > 0.0,
            "clock.fixed_step",
            "positive",
            c.fixed_step as f64,
        )?;
        require(
            c.max_steps_per_frame >= 1,
            "clock.max_steps_per_frame",
            "at least 1",
            c.max_steps_per_frame as f64,
        )?;
        require(
            c.max_frame_delta >= c.fixed_step,
            "clock.max_frame_delta",
            "at least one fixed step",
            c.max_frame_delta as f64,
        )?;
        require(
            c.initial_speed >= 0.0,
            "clock.initial_speed",
            "non-negative",
            c.initial_speed as f64,
        )?;

        let t = &self.terrain;
        require(t.tile_count >= 2, "terrain.tile_count", "at least 2", t.tile_count as f64)?;
        require(t.samples_x >= 2, "terrain.samples_x", "at least 2", t.samples_x as f64)?;
        require(t.samples_z >= 2, "terrain.samples_z", "at least 2", t.samples_z as f64)?;
        require(t.tile_depth > 0.0, "terrain.tile_depth", "positive", t.tile_depth as f64)?;
        require(
            t.roughness_min <= t.roughness_max,
            "terrain.roughness_min",
            "not above roughness_max",
            t.roughness_min as f64,
        )?;

        let o = &self.obstacles;
        require(
            o.max_obstacles >= 1,
            "obstacles.max_obstacles",
            "at least 1",
            o.max_obstacles as f64,
        )?;
        require(
            o.spawn_range > o.recycle_z.abs(),
            "obstacles.spawn_range",
            "beyond the recycle threshold",
            o.spawn_range as f64,
        )?;
        require(
            o.banner_brands >= 1,
            "obstacles.banner_brands",
            "at least 1",
            o.banner_brands as f64,
        )?;
        let w = &o.weights;
        for (field, value) in [
            ("obstacles.weights.tree", w.tree),
            ("obstacles.weights.jump_ramp", w.jump_ramp),
            ("obstacles.weights.banner_jump", w.banner_jump),
            ("obstacles.weights.pickup", w.pickup),
            ("obstacles.weights.rock", w.rock),
        ] {
            require(value >= 0.0, field, "non-negative", value as f64)?;
        }
        let sum = w.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(TuningError::WeightSum { sum });
        }

        let f = &self.fences;
        require(
            f.sections_per_side >= 1,
            "fences.sections_per_side",
            "at least 1",
            f.sections_per_side as f64,
        )?;
        require(
            f.section_length > 0.0,
            "fences.section_length",
            "positive",
            f.section_length as f64,
        )?;
        require(
            (0.0..=1.0).contains(&f.banner_chance),
            "fences.banner_chance",
            "within [0, 1]",
            f.banner_chance as f64,
        )?;
        require(
            f.banner_images >= 1,
            "fences.banner_images",
            "at least 1",
            f.banner_images as f64,
        )?;

        let s = &self.skier;
        require(
            s.tumble_duration > 0.0,
            "skier.tumble_duration",
            "positive",
            s.tumble_duration as f64,
        )?;
        require(
            s.jump_base_duration > 0.0,
            "skier.jump_base_duration",
            "positive",
            s.jump_base_duration as f64,
        )?;
        require(
            s.max_horizontal > 0.0,
            "skier.max_horizontal",
            "positive",
            s.max_horizontal as f64,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        Tuning::default().validate().unwrap();
        assert!((ObstacleWeights::default().sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "skier": { "starting_lives": 5 } }"#).unwrap();
        assert_eq!(tuning.skier.starting_lives, 5);
        assert_eq!(tuning.skier.movement_speed, SkierTuning::default().movement_speed);
        assert_eq!(tuning.obstacles, ObstacleTuning::default());
    }

    #[test]
    fn test_bad_weights_rejected() {
        let json = r#"{ "obstacles": { "weights": { "tree": 0.9, "jump_ramp": 0.9 } } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(err, TuningError::WeightSum { .. }));
    }

    #[test]
    fn test_zero_step_cap_rejected() {
        let json = r#"{ "clock": { "max_steps_per_frame": 0 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "clock.max_steps_per_frame",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse tuning JSON"));
    }

    #[test]
    fn test_json_round_trip_preserves_defaults() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
