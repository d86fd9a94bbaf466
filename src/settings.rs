//! Player preferences and performance modes
//!
//! Held in memory for the lifetime of the page; nothing is persisted.

use serde::{Deserialize, Serialize};

/// Performance mode chosen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformanceMode {
    /// Follow the measured frame rate
    #[default]
    Auto,
    High,
    Medium,
    Low,
}

impl PerformanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceMode::Auto => "Auto",
            PerformanceMode::High => "High",
            PerformanceMode::Medium => "Medium",
            PerformanceMode::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(PerformanceMode::Auto),
            "high" => Some(PerformanceMode::High),
            "medium" | "med" => Some(PerformanceMode::Medium),
            "low" => Some(PerformanceMode::Low),
            _ => None,
        }
    }

    /// Fixed level for a manual mode, `None` for Auto
    pub fn fixed_level(&self) -> Option<QualityLevel> {
        match self {
            PerformanceMode::Auto => None,
            PerformanceMode::High => Some(QualityLevel::High),
            PerformanceMode::Medium => Some(QualityLevel::Medium),
            PerformanceMode::Low => Some(QualityLevel::Low),
        }
    }
}

/// Rendering quality actually in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityLevel {
    /// Level that suits a measured frame rate
    pub fn for_fps(fps: u32) -> Self {
        if fps < 30 {
            QualityLevel::Low
        } else if fps < 45 {
            QualityLevel::Medium
        } else {
            QualityLevel::High
        }
    }

    /// Falling snow particles to draw
    pub fn snow_count(&self) -> usize {
        match self {
            QualityLevel::Low => 500,
            QualityLevel::Medium => 1000,
            QualityLevel::High => 2000,
        }
    }

    /// Device pixel ratio clamped for this level
    pub fn pixel_ratio(&self, device_ratio: f64) -> f64 {
        match self {
            QualityLevel::Low => device_ratio.min(1.0),
            QualityLevel::Medium => device_ratio.min(1.5),
            QualityLevel::High => device_ratio,
        }
    }
}

/// Frame-rate sampler driving Auto mode
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    mode: PerformanceMode,
    level: QualityLevel,
    frames: u32,
    window_start_ms: Option<f64>,
    fps: u32,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceMode::Auto)
    }
}

impl PerformanceMonitor {
    /// Auto starts at Medium until the first measurement
    pub fn new(mode: PerformanceMode) -> Self {
        Self {
            mode,
            level: mode.fixed_level().unwrap_or(QualityLevel::Medium),
            frames: 0,
            window_start_ms: None,
            fps: 60,
        }
    }

    /// Count a rendered frame. Every window of at least one second the frame
    /// rate is recomputed; in Auto mode the level may change, and the new
    /// level is returned when it does.
    pub fn record_frame(&mut self, timestamp_ms: f64) -> Option<QualityLevel> {
        let Some(start) = self.window_start_ms else {
            self.window_start_ms = Some(timestamp_ms);
            return None;
        };

        self.frames += 1;
        let window = timestamp_ms - start;
        if window < 1000.0 {
            return None;
        }

        self.fps = (self.frames as f64 * 1000.0 / window).round() as u32;
        self.frames = 0;
        self.window_start_ms = Some(timestamp_ms);

        if self.mode != PerformanceMode::Auto {
            return None;
        }
        let level = QualityLevel::for_fps(self.fps);
        if level == self.level {
            return None;
        }
        log::info!("Performance auto-adjusted to {:?} at {} fps", level, self.fps);
        self.level = level;
        Some(level)
    }

    /// Switch modes. Manual modes apply their level right away.
    pub fn set_mode(&mut self, mode: PerformanceMode) {
        if mode == self.mode {
            return;
        }
        log::info!("Performance mode set to {}", mode.as_str());
        self.mode = mode;
        self.level = mode.fixed_level().unwrap_or(QualityLevel::Medium);
    }

    pub fn mode(&self) -> PerformanceMode {
        self.mode
    }

    pub fn level(&self) -> QualityLevel {
        self.level
    }

    /// Last measured frame rate
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Restart sampling (after a pause or restart)
    pub fn reset(&mut self) {
        self.frames = 0;
        self.window_start_ms = None;
        self.fps = 60;
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub performance: PerformanceMode,
    /// Show FPS counter
    pub show_fps: bool,
    /// Steer by tilting the device
    pub tilt_controls: bool,
    /// Trail particles behind the skier
    pub snow_trail: bool,
    /// Floating score labels
    pub point_indicators: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            performance: PerformanceMode::Auto,
            show_fps: false,
            tilt_controls: true,
            snow_trail: true,
            point_indicators: true,
        }
    }
}

impl Settings {
    /// Low quality drops the trail regardless of preference
    pub fn effective_snow_trail(&self, level: QualityLevel) -> bool {
        self.snow_trail && level != QualityLevel::Low
    }
}
