//! Controls adapter
//!
//! Keyboard, touch-swipe and device-tilt events all fold into one
//! [`InputState`]. The game loop takes a snapshot once per frame, so every
//! fixed step in that frame sees the same intent.

use serde::{Deserialize, Serialize};

/// Swipe distance (CSS pixels) before a touch counts as a direction
pub const SWIPE_THRESHOLD: f64 = 20.0;
/// Left-right tilt (degrees of gamma) before the device counts as steering
pub const TILT_THRESHOLD: f64 = 10.0;

/// Semantic steering intent for one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
}

fn key_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        _ => None,
    }
}

/// Event-driven input collector
#[derive(Debug, Clone, Default)]
pub struct Controls {
    state: InputState,
    touch_start: Option<(f64, f64)>,
    /// Tilt steering can be turned off in settings
    pub tilt_enabled: bool,
}

impl Controls {
    pub fn new(tilt_enabled: bool) -> Self {
        Self {
            tilt_enabled,
            ..Default::default()
        }
    }

    fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Left => self.state.left = pressed,
            Direction::Right => self.state.right = pressed,
            Direction::Up => self.state.up = pressed,
            Direction::Down => self.state.down = pressed,
        }
    }

    /// Returns whether the key is a game key (so the caller can
    /// `preventDefault` it)
    pub fn key_down(&mut self, key: &str) -> bool {
        match key_direction(key) {
            Some(direction) => {
                self.set(direction, true);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match key_direction(key) {
            Some(direction) => {
                self.set(direction, false);
                true
            }
            None => false,
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Ignoring touch with non-finite coordinates");
            return;
        }
        self.touch_start = Some((x, y));
    }

    /// Direction comes from the offset against where the touch began
    pub fn touch_move(&mut self, x: f64, y: f64) {
        let Some((start_x, start_y)) = self.touch_start else {
            return;
        };
        if !x.is_finite() || !y.is_finite() {
            log::warn!("Ignoring touch with non-finite coordinates");
            return;
        }
        let dx = x - start_x;
        let dy = y - start_y;
        self.state = InputState::default();
        if dx.abs() > SWIPE_THRESHOLD {
            self.set(if dx > 0.0 { Direction::Right } else { Direction::Left }, true);
        }
        if dy.abs() > SWIPE_THRESHOLD {
            self.set(if dy > 0.0 { Direction::Down } else { Direction::Up }, true);
        }
    }

    pub fn touch_end(&mut self) {
        self.touch_start = None;
        self.state = InputState::default();
    }

    /// Device orientation gamma in degrees. Events without a usable gamma
    /// leave the state alone.
    pub fn tilt(&mut self, gamma: Option<f64>) {
        if !self.tilt_enabled {
            return;
        }
        let Some(gamma) = gamma.filter(|g| g.is_finite()) else {
            log::warn!("Ignoring orientation event without gamma");
            return;
        };
        self.state.left = gamma < -TILT_THRESHOLD;
        self.state.right = gamma > TILT_THRESHOLD;
    }

    /// Immutable copy for this frame
    pub fn snapshot(&self) -> InputState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = InputState::default();
        self.touch_start = None;
    }
}
