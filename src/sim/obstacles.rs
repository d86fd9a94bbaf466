//! Obstacle streaming
//!
//! A closed population of obstacles scrolls toward the skier. Anything that
//! passes behind the player is replaced on the spot by a fresh weighted-random
//! obstacle at the far spawn boundary, so the pool size never changes.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::SimTime;
use super::collision::{Footprint, boxes_overlap};
use crate::consts::SKIER_FOOTPRINT;
use crate::tuning::{ObstacleTuning, ObstacleWeights};

/// Things that knock the skier over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Tree,
    Rock,
}

/// Things that launch the skier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Ramp,
    /// Sponsored kicker with banner artwork `brand`
    Banner { brand: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Hazard(HazardKind),
    Jump(JumpKind),
    /// Hot chocolate, worth an extra life
    Pickup,
}

impl ObstacleKind {
    pub fn footprint(&self) -> Footprint {
        match self {
            ObstacleKind::Hazard(HazardKind::Tree) => Footprint::new(2.0, 4.0, 2.0),
            ObstacleKind::Hazard(HazardKind::Rock) => Footprint::new(1.6, 0.8, 1.6),
            ObstacleKind::Jump(JumpKind::Ramp) => Footprint::new(3.0, 0.5, 2.0),
            ObstacleKind::Jump(JumpKind::Banner { .. }) => Footprint::new(4.0, 1.0, 2.0),
            ObstacleKind::Pickup => Footprint::new(1.0, 1.0, 1.0),
        }
    }

    /// Jumps never crash the skier; everything else starts out solid
    pub fn starts_collidable(&self) -> bool {
        !matches!(self, ObstacleKind::Jump(_))
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self, ObstacleKind::Pickup)
    }
}

/// Buckets of the weighted spawn table, in cumulative order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleCategory {
    Tree,
    JumpRamp,
    BannerJump,
    Pickup,
    Rock,
}

/// Map a roll in [0, 1) onto a category.
///
/// Each category owns the half-open interval `[low, high)` of the cumulative
/// weights, in the order tree, jump ramp, banner jump, pickup, rock. A roll at
/// or past the final bound (rounding slack) falls back to rock.
pub fn select_category(weights: &ObstacleWeights, roll: f32) -> ObstacleCategory {
    let table = [
        (ObstacleCategory::Tree, weights.tree),
        (ObstacleCategory::JumpRamp, weights.jump_ramp),
        (ObstacleCategory::BannerJump, weights.banner_jump),
        (ObstacleCategory::Pickup, weights.pickup),
    ];
    let mut high = 0.0;
    for (category, weight) in table {
        high += weight;
        if roll < high {
            return category;
        }
    }
    ObstacleCategory::Rock
}

/// A live obstacle on the slope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub footprint: Footprint,
    /// Cleared when a pickup is collected so it cannot be collected twice
    pub is_collidable: bool,
    /// Visual float offset for pickups (does not affect collision)
    pub bob: f32,
    /// Visual glow intensity for pickups, 0-1
    pub glow: f32,
    anim_phase: f32,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            footprint: kind.footprint(),
            is_collidable: kind.starts_collidable(),
            bob: 0.0,
            glow: if kind.is_pickup() { 1.0 } else { 0.0 },
            anim_phase: id as f32 * 0.37,
        }
    }

    pub fn is_pickup(&self) -> bool {
        self.kind.is_pickup()
    }

    fn animate(&mut self, time: &SimTime) {
        if self.is_pickup() {
            let t = time.elapsed + self.anim_phase;
            self.bob = (t * 3.0).sin() * 0.2 + 0.2;
            self.glow = 0.75 + 0.25 * (t * 5.0).sin();
        }
    }
}

/// Fixed-size pool of obstacles ahead of the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleStreamer {
    tuning: ObstacleTuning,
    obstacles: Vec<Obstacle>,
    next_id: u32,
    /// Obstacles spawned since the last reset, including the initial fill
    spawned: u64,
}

impl ObstacleStreamer {
    pub fn new(tuning: ObstacleTuning) -> Self {
        Self {
            obstacles: Vec::with_capacity(tuning.max_obstacles),
            tuning,
            next_id: 1,
            spawned: 0,
        }
    }

    /// Fill the pool, spreading obstacles evenly along the spawn range
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.obstacles.clear();
        let max = self.tuning.max_obstacles;
        for i in 0..max {
            let depth = self.tuning.first_spawn_offset
                + i as f32 * self.tuning.spawn_range / max as f32;
            let obstacle = self.create_random_obstacle(depth, rng);
            self.obstacles.push(obstacle);
        }
        self.assert_pool_size();
    }

    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.next_id = 1;
        self.spawned = 0;
        self.initialize(rng);
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Draw a weighted-random obstacle `depth_offset` units ahead of the player
    pub fn create_random_obstacle<R: Rng>(&mut self, depth_offset: f32, rng: &mut R) -> Obstacle {
        let roll: f32 = rng.random();
        let kind = match select_category(&self.tuning.weights, roll) {
            ObstacleCategory::Tree => ObstacleKind::Hazard(HazardKind::Tree),
            ObstacleCategory::Rock => ObstacleKind::Hazard(HazardKind::Rock),
            ObstacleCategory::JumpRamp => ObstacleKind::Jump(JumpKind::Ramp),
            ObstacleCategory::BannerJump => ObstacleKind::Jump(JumpKind::Banner {
                brand: rng.random_range(0..self.tuning.banner_brands.max(1)),
            }),
            ObstacleCategory::Pickup => ObstacleKind::Pickup,
        };

        let half_width = if kind.is_pickup() {
            self.tuning.pickup_half_width
        } else {
            self.tuning.spawn_half_width
        };
        let x = if half_width > 0.0 {
            rng.random_range(-half_width..half_width)
        } else {
            0.0
        };
        let z = -depth_offset - rng.random::<f32>() * self.tuning.spawn_jitter;

        self.spawned += 1;
        let id = self.next_entity_id();
        Obstacle::new(id, kind, Vec3::new(x, 0.0, z))
    }

    /// Scroll obstacles toward the player and recycle those behind it
    pub fn update<R: Rng>(&mut self, speed: f32, time: &SimTime, rng: &mut R) {
        for obstacle in &mut self.obstacles {
            obstacle.position.z += speed;
            obstacle.animate(time);
        }

        for i in 0..self.obstacles.len() {
            if self.obstacles[i].position.z > self.tuning.recycle_z {
                let fresh = self.create_random_obstacle(self.tuning.spawn_range, rng);
                self.obstacles[i] = fresh;
            }
        }

        self.assert_pool_size();
    }

    /// Clear the collidable flag on `id`. Returns true only for the call that
    /// actually cleared it.
    pub fn mark_collected(&mut self, id: u32) -> bool {
        match self.obstacles.iter_mut().find(|o| o.id == id) {
            Some(obstacle) if obstacle.is_collidable => {
                obstacle.is_collidable = false;
                true
            }
            _ => false,
        }
    }

    /// Remove `id` and immediately spawn its replacement at the far boundary
    pub fn replace<R: Rng>(&mut self, id: u32, rng: &mut R) -> bool {
        let Some(index) = self.obstacles.iter().position(|o| o.id == id) else {
            return false;
        };
        let fresh = self.create_random_obstacle(self.tuning.spawn_range, rng);
        self.obstacles[index] = fresh;
        self.assert_pool_size();
        true
    }

    /// Ground-plane overlap between the skier at `player_pos` and `obstacle`
    pub fn is_colliding(&self, player_pos: Vec3, obstacle: &Obstacle) -> bool {
        boxes_overlap(player_pos, SKIER_FOOTPRINT, obstacle.position, obstacle.footprint)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Place an obstacle directly (scripted scenarios and tests). The pool
    /// size is unchanged: the obstacle in `slot` is overwritten.
    pub fn place(&mut self, slot: usize, kind: ObstacleKind, position: Vec3) -> Option<u32> {
        let id = self.next_entity_id();
        let target = self.obstacles.get_mut(slot)?;
        *target = Obstacle::new(id, kind, position);
        Some(id)
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn max_obstacles(&self) -> usize {
        self.tuning.max_obstacles
    }

    fn assert_pool_size(&self) {
        assert_eq!(
            self.obstacles.len(),
            self.tuning.max_obstacles,
            "obstacle pool size drifted"
        );
    }
}
