//! Trackside fences and banner advertisements
//!
//! Fence sections on both sides of the track recycle the same way obstacles
//! do. Banners hang on some sections; they come from a fixed, preallocated
//! pool and are checked out and returned by index so nothing is allocated
//! while the game runs.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::FenceTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign of the x coordinate on this side
    pub fn sign(&self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Index of a checked-out banner slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerHandle(usize);

impl BannerHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BannerSlot {
    pub in_use: bool,
    pub image: u8,
    pub side: Option<Side>,
}

/// Fixed-size arena of banner slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerPool {
    slots: Vec<BannerSlot>,
    free: Vec<usize>,
}

impl BannerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![BannerSlot::default(); capacity],
            // Pop from the back, so reverse to hand out low indices first
            free: (0..capacity).rev().collect(),
        }
    }

    /// Check out a slot showing `image` on `side`. `None` when exhausted.
    pub fn acquire(&mut self, image: u8, side: Side) -> Option<BannerHandle> {
        let index = self.free.pop()?;
        self.slots[index] = BannerSlot {
            in_use: true,
            image,
            side: Some(side),
        };
        Some(BannerHandle(index))
    }

    /// Return a slot. Releasing a slot that is not checked out is a no-op
    /// and returns false.
    pub fn release(&mut self, handle: BannerHandle) -> bool {
        match self.slots.get_mut(handle.0) {
            Some(slot) if slot.in_use => {
                *slot = BannerSlot::default();
                self.free.push(handle.0);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, handle: BannerHandle) -> Option<&BannerSlot> {
        self.slots.get(handle.0).filter(|slot| slot.in_use)
    }

    pub fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Return every slot
    pub fn clear(&mut self) {
        let capacity = self.slots.len();
        *self = Self::new(capacity);
    }
}

/// One length of fence beside the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FenceSection {
    pub side: Side,
    pub x: f32,
    pub z: f32,
    pub banner: Option<BannerHandle>,
}

/// Both fence lines plus the banner pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FenceStreamer {
    tuning: FenceTuning,
    sections: Vec<FenceSection>,
    pool: BannerPool,
}

impl FenceStreamer {
    pub fn new(tuning: FenceTuning) -> Self {
        Self {
            sections: Vec::with_capacity(tuning.sections_per_side * 2),
            pool: BannerPool::new(tuning.max_visible_banners),
            tuning,
        }
    }

    pub fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.sections.clear();
        self.pool.clear();
        for side in [Side::Left, Side::Right] {
            for i in 0..self.tuning.sections_per_side {
                let mut section = FenceSection {
                    side,
                    x: side.sign() * self.tuning.track_offset,
                    z: -(i as f32) * self.tuning.section_length,
                    banner: None,
                };
                self.maybe_hang_banner(&mut section, rng);
                self.sections.push(section);
            }
        }
    }

    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.initialize(rng);
    }

    /// Scroll sections and move any that passed the player to the back of
    /// their line, returning their banner to the pool first
    pub fn update<R: Rng>(&mut self, speed: f32, rng: &mut R) {
        let line_length = self.tuning.sections_per_side as f32 * self.tuning.section_length;
        for i in 0..self.sections.len() {
            let mut section = self.sections[i].clone();
            section.z += speed;
            if section.z > self.tuning.recycle_z {
                if let Some(handle) = section.banner.take() {
                    self.pool.release(handle);
                }
                section.z -= line_length;
                self.maybe_hang_banner(&mut section, rng);
            }
            self.sections[i] = section;
        }
    }

    fn maybe_hang_banner<R: Rng>(&mut self, section: &mut FenceSection, rng: &mut R) {
        if rng.random::<f32>() >= self.tuning.banner_chance {
            return;
        }
        let image = rng.random_range(0..self.tuning.banner_images.max(1));
        section.banner = self.pool.acquire(image, section.side);
        if section.banner.is_none() {
            log::trace!("Banner pool exhausted, leaving fence bare");
        }
    }

    pub fn sections(&self) -> &[FenceSection] {
        &self.sections
    }

    pub fn pool(&self) -> &BannerPool {
        &self.pool
    }

    pub fn visible_banners(&self) -> usize {
        self.sections.iter().filter(|s| s.banner.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pool_acquire_until_exhausted() {
        let mut pool = BannerPool::new(2);
        let a = pool.acquire(0, Side::Left).unwrap();
        let b = pool.acquire(1, Side::Right).unwrap();
        assert_ne!(a, b);
        assert!(pool.acquire(2, Side::Left).is_none());
        assert_eq!(pool.in_use(), 2);

        assert!(pool.release(a));
        let c = pool.acquire(3, Side::Right).unwrap();
        assert_eq!(c, a);
        assert_eq!(pool.get(c).map(|s| s.image), Some(3));
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = BannerPool::new(1);
        let a = pool.acquire(0, Side::Left).unwrap();
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.in_use(), 0);
        assert!(pool.get(a).is_none());
        // The slot was only returned once
        assert!(pool.acquire(0, Side::Left).is_some());
        assert!(pool.acquire(0, Side::Left).is_none());
    }

    #[test]
    fn test_banners_never_exceed_cap() {
        let tuning = FenceTuning {
            banner_chance: 1.0,
            max_visible_banners: 4,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut fences = FenceStreamer::new(tuning);
        fences.initialize(&mut rng);
        assert_eq!(fences.visible_banners(), 4);
        for _ in 0..2_000 {
            fences.update(0.4, &mut rng);
            assert!(fences.visible_banners() <= 4);
            assert_eq!(fences.visible_banners(), fences.pool().in_use());
        }
    }

    #[test]
    fn test_sections_keep_spacing() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut fences = FenceStreamer::new(FenceTuning::default());
        fences.initialize(&mut rng);
        for _ in 0..1_000 {
            fences.update(0.25, &mut rng);
        }
        assert_eq!(fences.sections().len(), 40);
        let mut left: Vec<f32> = fences
            .sections()
            .iter()
            .filter(|s| s.side == Side::Left)
            .map(|s| s.z)
            .collect();
        left.sort_by(|a, b| b.partial_cmp(a).unwrap());
        for pair in left.windows(2) {
            assert!((pair[0] - pair[1] - 6.0).abs() < 1e-2);
        }
        assert!(left.iter().all(|z| *z <= 10.0));
    }
}
