//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Time reaches animated entities as an explicit `SimTime`
//! - No rendering or platform dependencies beyond the input snapshot

pub mod clock;
pub mod collision;
pub mod demo;
pub mod effects;
pub mod fences;
pub mod obstacles;
pub mod resolver;
pub mod score;
pub mod skier;
pub mod state;
pub mod terrain;
pub mod tick;

pub use clock::{FrameSteps, SimTime, SimulationClock};
pub use collision::{Footprint, boxes_overlap, clears_height, hits};
pub use demo::DemoPilot;
pub use effects::{Effects, IndicatorLabel, PointIndicator, TrailParticle};
pub use fences::{BannerHandle, BannerPool, FenceSection, FenceStreamer, Side};
pub use obstacles::{
    HazardKind, JumpKind, Obstacle, ObstacleCategory, ObstacleKind, ObstacleStreamer,
    select_category,
};
pub use resolver::{award_flips, resolve_collisions};
pub use score::Score;
pub use skier::{JumpParams, MotionState, Skier, SkierUpdate};
pub use state::{GameEvent, GamePhase, GameState};
pub use terrain::{TerrainStreamer, TerrainTile, generate_heights};
pub use tick::tick;
