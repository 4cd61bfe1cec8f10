//! Frame clock sampled once per step

use serde::{Deserialize, Serialize};

/// Simulation time for the current step.
///
/// `now` only ever moves forward. Cooldowns, poison ticks and poll
/// intervals all compare against it instead of owning timers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Seconds since the session started
    now: f32,
    /// Scaled duration of the last step
    delta: f32,
    /// Multiplier applied to every step (0 pauses the session)
    time_scale: f32,
    /// Steps taken so far
    frame: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame: 0,
        }
    }

    /// Advance by `dt` seconds of host time, scaled by the time scale.
    /// Returns the scaled delta.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.delta = dt.max(0.0) * self.time_scale;
        self.now += self.delta;
        self.frame += 1;
        self.delta
    }

    #[inline]
    pub fn now(&self) -> f32 {
        self.now
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale (negative values clamp to 0)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
