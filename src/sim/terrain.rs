//! Endless terrain streaming
//!
//! A fixed ring of heightmapped tiles scrolls toward the camera. The tile that
//! passes behind the camera is regenerated in place and re-attached at the far
//! end, so the strip stays contiguous with a constant tile count.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::TerrainTuning;

/// One heightmapped slab of slope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainTile {
    /// World z of the tile origin (the player sits near z = 0)
    pub origin_z: f32,
    pub roughness: f32,
    /// Phase of the bump pattern, randomized per tile
    pub phase: f32,
    /// Row-major heights, `samples_x * samples_z`
    pub heights: Vec<f32>,
    /// Bumped every time the heights are regenerated
    pub generation: u32,
}

impl TerrainTile {
    fn new(origin_z: f32, roughness: f32, phase: f32, tuning: &TerrainTuning) -> Self {
        let mut tile = Self {
            origin_z,
            roughness,
            phase,
            heights: Vec::with_capacity(tuning.samples_x * tuning.samples_z),
            generation: 0,
        };
        generate_heights(tuning, roughness, phase, &mut tile.heights);
        tile
    }

    /// Throw away the old heights and build new ones in the same buffer
    fn regenerate(&mut self, origin_z: f32, roughness: f32, phase: f32, tuning: &TerrainTuning) {
        self.heights.clear();
        self.origin_z = origin_z;
        self.roughness = roughness;
        self.phase = phase;
        generate_heights(tuning, roughness, phase, &mut self.heights);
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Fill `out` with a ski-slope heightmap.
///
/// Combines a downhill gradient, a valley term that lifts the edges so the
/// track bounds itself, and a periodic bump pattern that fades toward the
/// edges. Deterministic for a given roughness and phase.
pub fn generate_heights(tuning: &TerrainTuning, roughness: f32, phase: f32, out: &mut Vec<f32>) {
    let sx = tuning.samples_x;
    let sz = tuning.samples_z;
    for z in 0..sz {
        let zf = z as f32;
        let slope = -zf / sz as f32 * 2.0;
        for x in 0..sx {
            let xf = x as f32;
            let x_pos = xf / (sx - 1) as f32 * 2.0 - 1.0;
            let edge = x_pos * x_pos;
            let valley = tuning.valley_lift * edge;
            let bumps = (zf / 10.0 + phase).sin() * (xf / 5.0).cos() * roughness;
            out.push(slope + valley - bumps * (1.0 - edge));
        }
    }
}

/// Ring of terrain tiles around the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainStreamer {
    tuning: TerrainTuning,
    tiles: VecDeque<TerrainTile>,
    recycled: u64,
}

impl TerrainStreamer {
    pub fn new(tuning: TerrainTuning) -> Self {
        Self {
            tiles: VecDeque::with_capacity(tuning.tile_count),
            tuning,
            recycled: 0,
        }
    }

    /// Build the initial strip
    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.reset(rng);
    }

    /// Scroll every tile toward the camera by `speed` and recycle any tile
    /// that has passed the threshold behind the player
    pub fn update<R: Rng>(&mut self, speed: f32, rng: &mut R) {
        for tile in &mut self.tiles {
            tile.origin_z += speed;
        }

        while self
            .tiles
            .front()
            .is_some_and(|tile| tile.origin_z > self.tuning.recycle_z)
        {
            let Some(mut tile) = self.tiles.pop_front() else {
                break;
            };
            let last_z = self
                .tiles
                .back()
                .map_or(tile.origin_z, |last| last.origin_z);
            let roughness = self.random_roughness(rng);
            let phase = rng.random_range(0.0..std::f32::consts::TAU);
            tile.regenerate(last_z - self.tuning.tile_depth, roughness, phase, &self.tuning);
            self.tiles.push_back(tile);
            self.recycled += 1;
            log::trace!("Recycled terrain tile (total {})", self.recycled);
        }

        assert_eq!(
            self.tiles.len(),
            self.tuning.tile_count,
            "terrain tile count drifted"
        );
    }

    /// Drop all tiles and lay out a fresh strip from z = 0 backward
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.tiles.clear();
        self.recycled = 0;
        for i in 0..self.tuning.tile_count {
            let z = -(i as f32) * self.tuning.tile_depth;
            let roughness = self.random_roughness(rng);
            let phase = rng.random_range(0.0..std::f32::consts::TAU);
            self.tiles
                .push_back(TerrainTile::new(z, roughness, phase, &self.tuning));
        }
    }

    fn random_roughness<R: Rng>(&self, rng: &mut R) -> f32 {
        let (min, max) = (self.tuning.roughness_min, self.tuning.roughness_max);
        if max > min {
            rng.random_range(min..max)
        } else {
            min
        }
    }

    /// Tiles ordered nearest (largest z) to farthest
    pub fn tiles(&self) -> impl Iterator<Item = &TerrainTile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles recycled since the last reset
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    pub fn tuning(&self) -> &TerrainTuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn streamer() -> (TerrainStreamer, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut terrain = TerrainStreamer::new(TerrainTuning::default());
        terrain.initialize(&mut rng);
        (terrain, rng)
    }

    fn assert_contiguous(terrain: &TerrainStreamer) {
        let depth = terrain.tuning().tile_depth;
        let zs: Vec<f32> = terrain.tiles().map(|t| t.origin_z).collect();
        for pair in zs.windows(2) {
            assert!(
                (pair[0] - pair[1] - depth).abs() < 1e-3,
                "gap between tiles at {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_initialize_lays_out_strip() {
        let (terrain, _) = streamer();
        assert_eq!(terrain.len(), 10);
        assert_eq!(terrain.tiles().next().map(|t| t.origin_z), Some(0.0));
        assert_contiguous(&terrain);
    }

    #[test]
    fn test_recycles_tile_behind_camera() {
        let (mut terrain, mut rng) = streamer();
        // Move the front tile just past the threshold
        terrain.update(10.5, &mut rng);
        assert_eq!(terrain.recycled(), 1);
        assert_eq!(terrain.len(), 10);
        let last = terrain.tiles().last().unwrap();
        assert_eq!(last.generation, 1);
        assert_contiguous(&terrain);
    }

    #[test]
    fn test_long_run_stays_contiguous_and_bounded() {
        let (mut terrain, mut rng) = streamer();
        let samples = 11 * 11;
        for _ in 0..5_000 {
            terrain.update(0.3, &mut rng);
        }
        assert!(terrain.recycled() > 50);
        assert_eq!(terrain.len(), 10);
        assert_contiguous(&terrain);
        for tile in terrain.tiles() {
            assert_eq!(tile.heights.len(), samples);
            assert!(tile.heights.capacity() <= samples * 2);
            assert!(tile.origin_z <= 10.0 + 0.3);
        }
    }

    #[test]
    fn test_heights_deterministic_for_roughness_and_phase() {
        let tuning = TerrainTuning::default();
        let mut a = Vec::new();
        let mut b = Vec::new();
        generate_heights(&tuning, 0.7, 1.3, &mut a);
        generate_heights(&tuning, 0.7, 1.3, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_valley_edges_rise_above_center() {
        let tuning = TerrainTuning {
            samples_x: 11,
            samples_z: 11,
            ..Default::default()
        };
        let mut heights = Vec::new();
        generate_heights(&tuning, 0.0, 0.0, &mut heights);
        let row = &heights[0..11];
        assert!(row[0] > row[5]);
        assert!(row[10] > row[5]);
    }

    #[test]
    fn test_slope_descends_downhill() {
        let tuning = TerrainTuning::default();
        let mut heights = Vec::new();
        generate_heights(&tuning, 0.0, 0.0, &mut heights);
        let center = 5;
        let first_row = heights[center];
        let last_row = heights[10 * 11 + center];
        assert!(last_row < first_row);
    }
}
