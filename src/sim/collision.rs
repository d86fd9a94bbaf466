//! Collision detection for the slope
//!
//! Everything on the slope is treated as an axis-aligned box. The base test
//! only looks at the ground plane (x, z); height is a separate gate the
//! caller can layer on for airborne checks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Box extents of an entity, centered on its position in x and z and
/// standing on its position in y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Footprint {
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Half extents on the ground plane
    #[inline]
    pub fn half_extents(&self) -> (f32, f32) {
        (self.width / 2.0, self.depth / 2.0)
    }
}

/// Overlap thresholds for a pair of footprints: (x, z)
#[inline]
pub fn overlap_thresholds(a: Footprint, b: Footprint) -> (f32, f32) {
    let (ax, az) = a.half_extents();
    let (bx, bz) = b.half_extents();
    (ax + bx, az + bz)
}

/// Ground-plane box overlap.
///
/// Strict inequality: boxes that exactly touch (`distance == threshold`) do
/// not collide.
pub fn boxes_overlap(a_pos: Vec3, a: Footprint, b_pos: Vec3, b: Footprint) -> bool {
    let (x_threshold, z_threshold) = overlap_thresholds(a, b);
    let x_distance = (a_pos.x - b_pos.x).abs();
    let z_distance = (a_pos.z - b_pos.z).abs();
    x_distance < x_threshold && z_distance < z_threshold
}

/// Whether something at altitude `y` passes above a box standing at `base`
#[inline]
pub fn clears_height(y: f32, base: Vec3, footprint: Footprint) -> bool {
    y > base.y + footprint.height
}

/// Ground overlap with the height gate applied
pub fn hits(a_pos: Vec3, a: Footprint, b_pos: Vec3, b: Footprint) -> bool {
    !clears_height(a_pos.y, b_pos, b) && boxes_overlap(a_pos, a, b_pos, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SKIER_FOOTPRINT;

    const TREE: Footprint = Footprint::new(2.0, 4.0, 2.0);

    #[test]
    fn test_same_position_collides() {
        assert!(boxes_overlap(Vec3::ZERO, SKIER_FOOTPRINT, Vec3::ZERO, TREE));
    }

    #[test]
    fn test_touching_boundary_does_not_collide() {
        let (x_threshold, z_threshold) = overlap_thresholds(SKIER_FOOTPRINT, TREE);

        let beside = Vec3::new(x_threshold, 0.0, 0.0);
        assert!(!boxes_overlap(Vec3::ZERO, SKIER_FOOTPRINT, beside, TREE));

        let ahead = Vec3::new(0.0, 0.0, -z_threshold);
        assert!(!boxes_overlap(Vec3::ZERO, SKIER_FOOTPRINT, ahead, TREE));
    }

    #[test]
    fn test_just_inside_boundary_collides() {
        let (x_threshold, z_threshold) = overlap_thresholds(SKIER_FOOTPRINT, TREE);
        let eps = 1e-4;

        let beside = Vec3::new(x_threshold - eps, 0.0, 0.0);
        assert!(boxes_overlap(Vec3::ZERO, SKIER_FOOTPRINT, beside, TREE));

        let ahead = Vec3::new(0.0, 0.0, z_threshold - eps);
        assert!(boxes_overlap(Vec3::ZERO, SKIER_FOOTPRINT, ahead, TREE));
    }

    #[test]
    fn test_height_ignored_by_base_test() {
        let airborne = Vec3::new(0.0, 50.0, 0.0);
        assert!(boxes_overlap(airborne, SKIER_FOOTPRINT, Vec3::ZERO, TREE));
    }

    #[test]
    fn test_height_gate() {
        let rock = Footprint::new(1.6, 0.8, 1.6);
        let low = Vec3::new(0.0, 0.5, 0.0);
        let high = Vec3::new(0.0, 0.9, 0.0);
        assert!(hits(low, SKIER_FOOTPRINT, Vec3::ZERO, rock));
        assert!(!hits(high, SKIER_FOOTPRINT, Vec3::ZERO, rock));
        // Exactly at the top still touches
        let top = Vec3::new(0.0, 0.8, 0.0);
        assert!(hits(top, SKIER_FOOTPRINT, Vec3::ZERO, rock));
    }
}
