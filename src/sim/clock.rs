//! Fixed timestep clock
//!
//! Turns variable wall-clock frame timestamps into a bounded number of
//! constant-length simulation steps, and owns the forward speed scalar.

use serde::{Deserialize, Serialize};

use crate::tuning::ClockTuning;

/// Work the clock hands to the game loop for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    /// Length of every step (always the fixed step)
    pub delta_time: f32,
    /// Number of fixed steps to run this frame (0..=max_steps_per_frame)
    pub steps_to_run: u32,
}

/// Simulation time passed explicitly to every animated entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Seconds of simulated play since the last reset
    pub elapsed: f32,
    /// Length of the current step
    pub dt: f32,
}

/// Fixed-step accumulator plus the game speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    tuning: ClockTuning,
    last_timestamp_ms: Option<f64>,
    accumulated: f64,
    speed: f32,
    total_steps: u64,
}

impl SimulationClock {
    pub fn new(tuning: ClockTuning) -> Self {
        let speed = tuning.initial_speed;
        Self {
            tuning,
            last_timestamp_ms: None,
            accumulated: 0.0,
            speed,
            total_steps: 0,
        }
    }

    /// Feed a display timestamp (milliseconds) and get the steps to simulate.
    ///
    /// The first call only seeds the clock. Later calls clamp the frame delta
    /// to `[0, max_frame_delta]`, accumulate it and drain whole fixed steps, at
    /// most `max_steps_per_frame` of them.
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameSteps {
        let step = self.tuning.fixed_step as f64;
        let max_delta = self.tuning.max_frame_delta as f64;

        let frame_delta = match self.last_timestamp_ms {
            None => 0.0,
            Some(last) => ((timestamp_ms - last) / 1000.0).clamp(0.0, max_delta),
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        self.accumulated += frame_delta;

        let mut steps = 0;
        while self.accumulated >= step && steps < self.tuning.max_steps_per_frame {
            self.accumulated -= step;
            steps += 1;
        }

        // Backlog left by capped frames never exceeds one frame's worth
        self.accumulated = self.accumulated.min(max_delta);

        self.total_steps += steps as u64;

        FrameSteps {
            delta_time: self.tuning.fixed_step,
            steps_to_run: steps,
        }
    }

    /// Advance speed by the ramp rate for `delta_time` seconds
    pub fn increase_speed(&mut self, delta_time: f32) {
        self.speed += self.tuning.speed_ramp * delta_time * 60.0;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn fixed_step(&self) -> f32 {
        self.tuning.fixed_step
    }

    /// Steps executed since the last reset
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Time value for step number `step` since the last reset
    pub fn time_at(&self, step: u64) -> SimTime {
        SimTime {
            elapsed: step as f32 * self.tuning.fixed_step,
            dt: self.tuning.fixed_step,
        }
    }

    /// Restore initial speed and clear accumulators (game restart, not pause)
    pub fn reset(&mut self) {
        self.last_timestamp_ms = None;
        self.accumulated = 0.0;
        self.speed = self.tuning.initial_speed;
        self.total_steps = 0;
    }

    /// Forget the last timestamp so a resumed loop does not see the pause as
    /// elapsed time. Speed and backlog are kept.
    pub fn resync(&mut self) {
        self.last_timestamp_ms = None;
    }
}
