//! Renderer-facing frame data
//!
//! The renderer never touches `GameState`. Each frame the session flattens
//! the world into GPU-ready records: one [`Globals`] block, a list of
//! [`EntityInstance`]s, and the terrain heightmaps. Buffers are reused
//! between frames.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::settings::{QualityLevel, Settings};
use crate::sim::{
    FenceSection, GameState, HazardKind, IndicatorLabel, JumpKind, ObstacleKind, SimTime,
};

/// Instance kinds (must match shader)
pub mod kind {
    pub const SKIER: u32 = 0;
    pub const TREE: u32 = 1;
    pub const ROCK: u32 = 2;
    pub const RAMP: u32 = 3;
    pub const BANNER_JUMP: u32 = 4;
    pub const PICKUP: u32 = 5;
    pub const FENCE: u32 = 6;
    pub const BANNER: u32 = 7;
    pub const TRAIL: u32 = 8;
    pub const INDICATOR: u32 = 9;
}

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4], // offset 0
    pub camera_pos: [f32; 3],     // offset 64
    pub time: f32,                // offset 76
    pub instance_count: u32,      // offset 80
    pub tile_count: u32,          // offset 84
    pub snow_count: u32,          // offset 88
    pub life_flash: f32,          // offset 92
}

/// One drawable thing in the world
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct EntityInstance {
    pub position: [f32; 3],
    pub kind: u32,
    /// Euler angles (pitch, yaw, roll)
    pub rotation: [f32; 3],
    /// Kind-specific: banner image, brand, points on an indicator
    pub variant: u32,
    pub scale: [f32; 3],
    pub opacity: f32,
}

/// Where a tile's heights start in the shared height buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct TileHeader {
    pub origin_z: f32,
    pub first_height: u32,
    pub samples_x: u32,
    pub samples_z: u32,
}

/// Follow camera behind and above the skier
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    /// Offset of the eye from the skier's lateral position
    eye_offset: Vec3,
    /// Offset of the look-at point
    target_offset: Vec3,
    eye: Vec3,
    target: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        let eye_offset = Vec3::new(0.0, 5.0, 10.0);
        let target_offset = Vec3::new(0.0, 0.0, -10.0);
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            eye_offset,
            target_offset,
            eye: eye_offset,
            target: target_offset,
        }
    }
}

impl CameraRig {
    /// Match the viewport. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn follow(&mut self, skier_x: f32) {
        let lateral = Vec3::new(skier_x, 0.0, 0.0);
        self.eye = lateral + self.eye_offset;
        self.target = lateral + self.target_offset;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// CPU-side copy of everything the GPU needs for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub globals: Globals,
    pub instances: Vec<EntityInstance>,
    pub tiles: Vec<TileHeader>,
    pub heights: Vec<f32>,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            globals: Globals::zeroed(),
            instances: Vec::new(),
            tiles: Vec::new(),
            heights: Vec::new(),
        }
    }
}

impl RenderFrame {
    /// Rebuild from the current state, reusing allocations
    pub fn build(
        &mut self,
        state: &GameState,
        settings: &Settings,
        level: QualityLevel,
        camera: &CameraRig,
        time: SimTime,
    ) {
        self.instances.clear();
        self.tiles.clear();
        self.heights.clear();

        let skier = &state.skier;
        self.instances.push(EntityInstance {
            position: skier.position.to_array(),
            kind: kind::SKIER,
            rotation: skier.rotation.to_array(),
            scale: [1.0; 3],
            opacity: 1.0,
            ..Default::default()
        });

        for obstacle in state.obstacles.obstacles() {
            // Collected hot chocolate is gone until its slot respawns
            if obstacle.is_pickup() && !obstacle.is_collidable {
                continue;
            }
            let (kind, variant) = match obstacle.kind {
                ObstacleKind::Hazard(HazardKind::Tree) => (kind::TREE, 0),
                ObstacleKind::Hazard(HazardKind::Rock) => (kind::ROCK, 0),
                ObstacleKind::Jump(JumpKind::Ramp) => (kind::RAMP, 0),
                ObstacleKind::Jump(JumpKind::Banner { brand }) => (kind::BANNER_JUMP, brand as u32),
                ObstacleKind::Pickup => (kind::PICKUP, 0),
            };
            let fp = obstacle.footprint;
            let mut position = obstacle.position;
            position.y += obstacle.bob;
            self.instances.push(EntityInstance {
                position: position.to_array(),
                kind,
                rotation: [0.0; 3],
                variant,
                scale: [fp.width, fp.height, fp.depth],
                opacity: if obstacle.is_pickup() { obstacle.glow } else { 1.0 },
            });
        }

        for section in state.fences.sections() {
            self.push_fence(state, section);
        }

        if settings.effective_snow_trail(level) {
            for particle in &state.effects.trail {
                self.instances.push(EntityInstance {
                    position: particle.position.to_array(),
                    kind: kind::TRAIL,
                    scale: [particle.size; 3],
                    opacity: particle.opacity(),
                    ..Default::default()
                });
            }
        }

        if settings.point_indicators {
            for indicator in &state.effects.indicators {
                let variant = match indicator.label {
                    IndicatorLabel::Points(points) => points.min(u32::MAX as u64) as u32,
                    IndicatorLabel::ExtraLife => u32::MAX,
                };
                self.instances.push(EntityInstance {
                    position: indicator.position.to_array(),
                    kind: kind::INDICATOR,
                    variant,
                    scale: [1.0; 3],
                    opacity: indicator.opacity(),
                    ..Default::default()
                });
            }
        }

        let terrain = state.terrain.tuning();
        for tile in state.terrain.tiles() {
            self.tiles.push(TileHeader {
                origin_z: tile.origin_z,
                first_height: self.heights.len() as u32,
                samples_x: terrain.samples_x as u32,
                samples_z: terrain.samples_z as u32,
            });
            self.heights.extend_from_slice(&tile.heights);
        }

        self.globals = Globals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.eye().to_array(),
            time: time.elapsed,
            instance_count: self.instances.len() as u32,
            tile_count: self.tiles.len() as u32,
            snow_count: level.snow_count() as u32,
            life_flash: state.effects.life_flash,
        };
    }

    fn push_fence(&mut self, state: &GameState, section: &FenceSection) {
        let length = state.tuning.fences.section_length;
        let position = [section.x, 0.0, section.z];
        self.instances.push(EntityInstance {
            position,
            kind: kind::FENCE,
            scale: [0.2, 1.0, length],
            opacity: 1.0,
            ..Default::default()
        });
        let banner = section
            .banner
            .and_then(|handle| state.fences.pool().get(handle));
        if let Some(slot) = banner {
            self.instances.push(EntityInstance {
                position,
                kind: kind::BANNER,
                variant: slot.image as u32,
                scale: [0.1, 1.0, length * 0.8],
                opacity: 1.0,
                ..Default::default()
            });
        }
    }

    pub fn globals_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.globals)
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn tile_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tiles)
    }

    pub fn height_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.heights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn frame_for(state: &GameState, settings: &Settings) -> RenderFrame {
        let mut frame = RenderFrame::default();
        frame.build(
            state,
            settings,
            QualityLevel::Medium,
            &CameraRig::default(),
            SimTime::default(),
        );
        frame
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<Globals>(), 96);
        assert_eq!(std::mem::size_of::<EntityInstance>(), 48);
        assert_eq!(std::mem::size_of::<TileHeader>(), 16);
    }

    #[test]
    fn test_frame_covers_world() {
        let state = GameState::new(3, Tuning::default());
        let frame = frame_for(&state, &Settings::default());

        assert_eq!(frame.instances[0].kind, kind::SKIER);
        let obstacles = frame
            .instances
            .iter()
            .filter(|i| (kind::TREE..=kind::PICKUP).contains(&i.kind))
            .count();
        assert_eq!(obstacles, 50);
        let fences = frame.instances.iter().filter(|i| i.kind == kind::FENCE).count();
        assert_eq!(fences, 40);

        assert_eq!(frame.tiles.len(), 10);
        assert_eq!(frame.heights.len(), 10 * 11 * 11);
        assert_eq!(frame.tiles[1].first_height, 121);
        assert_eq!(frame.globals.instance_count as usize, frame.instances.len());
        assert_eq!(frame.height_bytes().len(), frame.heights.len() * 4);
        assert_eq!(frame.instance_bytes().len(), frame.instances.len() * 48);
    }

    #[test]
    fn test_collected_pickup_hidden() {
        let mut state = GameState::new(3, Tuning::default());
        let id = state
            .obstacles
            .place(0, ObstacleKind::Pickup, Vec3::new(0.0, 0.0, -20.0))
            .unwrap();
        let shown = frame_for(&state, &Settings::default()).instances.len();
        state.obstacles.mark_collected(id);
        let hidden = frame_for(&state, &Settings::default()).instances.len();
        assert_eq!(hidden, shown - 1);
    }

    #[test]
    fn test_camera_follows_and_resizes() {
        let mut camera = CameraRig::default();
        camera.resize(800, 400);
        assert_eq!(camera.aspect(), 2.0);
        camera.resize(0, 400);
        assert_eq!(camera.aspect(), 2.0);

        camera.follow(3.0);
        assert_eq!(camera.eye(), Vec3::new(3.0, 5.0, 10.0));

        // The look-at point lands in the center of the screen
        let clip = camera.view_proj() * glam::Vec4::new(3.0, 0.0, -10.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
    }

    #[test]
    fn test_indicators_respect_settings() {
        let mut state = GameState::new(3, Tuning::default());
        state
            .effects
            .spawn_indicator(IndicatorLabel::Points(10), Vec3::ZERO);
        let on = frame_for(&state, &Settings::default());
        assert!(on.instances.iter().any(|i| i.kind == kind::INDICATOR && i.variant == 10));

        let settings = Settings {
            point_indicators: false,
            ..Default::default()
        };
        let off = frame_for(&state, &settings);
        assert!(!off.instances.iter().any(|i| i.kind == kind::INDICATOR));
    }
}
