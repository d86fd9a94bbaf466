//! Score accumulator
//!
//! Distance accrues continuously (one unit of speed per step); bonuses are
//! discrete. The displayed score is `floor(distance) + bonus`, which never
//! decreases within a session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    distance: f64,
    bonus: u64,
    /// (jump serial, flip count) of the last flip reading that paid out
    last_flip_read: Option<(u32, u32)>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_distance(&mut self, speed: f32) {
        if speed > 0.0 {
            self.distance += speed as f64;
        }
    }

    pub fn add_bonus(&mut self, points: u64) {
        self.bonus += points;
    }

    /// Pay out the flips of jump `serial`. Returns the points awarded, or
    /// `None` when there is nothing new to pay (no flips, or this exact
    /// reading was already paid).
    pub fn award_flips(&mut self, serial: u32, flips: u32, points_per_flip: u64) -> Option<u64> {
        if flips == 0 || self.last_flip_read == Some((serial, flips)) {
            return None;
        }
        self.last_flip_read = Some((serial, flips));
        let points = flips as u64 * points_per_flip;
        self.bonus += points;
        Some(points)
    }

    pub fn total(&self) -> u64 {
        self.distance.floor() as u64 + self.bonus
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn bonus(&self) -> u64 {
        self.bonus
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_floors_distance() {
        let mut score = Score::new();
        for _ in 0..15 {
            score.add_distance(0.1);
        }
        assert_eq!(score.total(), 1);
        score.add_bonus(10);
        assert_eq!(score.total(), 11);
    }

    #[test]
    fn test_flips_paid_once_per_reading() {
        let mut score = Score::new();
        assert_eq!(score.award_flips(1, 2, 50), Some(100));
        assert_eq!(score.award_flips(1, 2, 50), None);
        assert_eq!(score.bonus(), 100);
    }

    #[test]
    fn test_next_jump_with_same_count_is_paid() {
        let mut score = Score::new();
        assert_eq!(score.award_flips(1, 1, 50), Some(50));
        assert_eq!(score.award_flips(2, 1, 50), Some(50));
        assert_eq!(score.bonus(), 100);
    }

    #[test]
    fn test_zero_flips_pay_nothing() {
        let mut score = Score::new();
        assert_eq!(score.award_flips(1, 0, 50), None);
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn test_long_run_distance_stays_exact() {
        // A hundred minutes of steps at 0.1 units each
        let mut score = Score::new();
        for _ in 0..360_000 {
            score.add_distance(0.1);
        }
        assert_eq!(score.total(), 36_000);
    }

    #[test]
    fn test_reset() {
        let mut score = Score::new();
        score.add_distance(12.5);
        score.award_flips(1, 1, 50);
        score.reset();
        assert_eq!(score.total(), 0);
        assert_eq!(score.award_flips(1, 1, 50), Some(50));
    }
}
