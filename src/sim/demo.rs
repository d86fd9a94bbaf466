//! Demo mode pilot
//!
//! Stands in for the controls adapter on the attract screen. It wanders
//! randomly, holding each choice for a while, and swerves away from the
//! nearest hazard in its lane.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::obstacles::ObstacleKind;
use super::state::GameState;
use crate::ground_distance;
use crate::platform::InputState;

/// How far ahead (world units) the pilot looks for hazards
const LOOK_AHEAD: f32 = 12.0;
/// Lateral gap the pilot wants between itself and a hazard
const CLEARANCE: f32 = 2.0;
/// Frames a wander choice is held for (one `next_input` per frame)
const HOLD_MIN: u32 = 15;
const HOLD_MAX: u32 = 45;

#[derive(Debug, Clone)]
pub struct DemoPilot {
    rng: Pcg32,
    wander: InputState,
    hold: u32,
}

impl DemoPilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wander: InputState::default(),
            hold: 0,
        }
    }

    /// Input for the next step
    pub fn next_input(&mut self, state: &GameState) -> InputState {
        let skier = state.skier.position;
        let half_width = state.tuning.skier.max_horizontal;

        let threat = state
            .obstacles
            .obstacles()
            .iter()
            .filter(|o| matches!(o.kind, ObstacleKind::Hazard(_)) && o.is_collidable)
            .filter(|o| o.position.z < 1.0 && o.position.z > -LOOK_AHEAD)
            .filter(|o| (o.position.x - skier.x).abs() < CLEARANCE)
            .min_by(|a, b| {
                ground_distance(a.position, skier)
                    .partial_cmp(&ground_distance(b.position, skier))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(hazard) = threat {
            // Swerve away, unless the fence is in the way
            let go_left = if skier.x <= -half_width + CLEARANCE {
                false
            } else if skier.x >= half_width - CLEARANCE {
                true
            } else {
                hazard.position.x >= skier.x
            };
            self.hold = 0;
            return InputState {
                left: go_left,
                right: !go_left,
                ..Default::default()
            };
        }

        if self.hold == 0 {
            self.hold = self.rng.random_range(HOLD_MIN..HOLD_MAX);
            self.wander = match self.rng.random_range(0..3) {
                0 => InputState {
                    left: true,
                    ..Default::default()
                },
                1 => InputState {
                    right: true,
                    ..Default::default()
                },
                _ => InputState::default(),
            };
        }
        self.hold -= 1;

        // Drift back toward the middle near the edges
        if skier.x <= -half_width + 1.0 {
            self.wander.left = false;
        }
        if skier.x >= half_width - 1.0 {
            self.wander.right = false;
        }
        self.wander
    }
}
