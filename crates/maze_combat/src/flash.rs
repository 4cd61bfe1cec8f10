//! Hit feedback: blink a few times after taking damage

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Number of on/off blinks
    pub flash_count: u32,
    /// Seconds each half of a blink lasts
    pub flash_duration: f32,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            flash_count: 2,
            flash_duration: 0.15,
        }
    }
}

/// Blink sequence keyed on elapsed time.
///
/// Each blink is `flash_duration` lit followed by `flash_duration` unlit.
/// Triggering again restarts the sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageFlash {
    pub config: FlashConfig,
    started_at: Option<f32>,
}

impl DamageFlash {
    pub fn new(config: FlashConfig) -> Self {
        Self {
            config,
            started_at: None,
        }
    }

    /// Start (or restart) the sequence
    pub fn trigger(&mut self, now: f32) {
        self.started_at = Some(now);
    }

    fn total_duration(&self) -> f32 {
        self.config.flash_count as f32 * self.config.flash_duration * 2.0
    }

    /// Whether the sequence is still running
    pub fn is_active(&self, now: f32) -> bool {
        self.started_at
            .is_some_and(|start| now - start < self.total_duration())
    }

    /// Whether the flash colour should be shown right now
    pub fn is_lit(&self, now: f32) -> bool {
        let Some(start) = self.started_at else {
            return false;
        };
        if !self.is_active(now) || self.config.flash_duration <= 0.0 {
            return false;
        }
        let phase = ((now - start) / self.config.flash_duration).floor() as u32;
        phase % 2 == 0
    }

    /// Drop a finished sequence so the owner reverts to its base colour
    pub fn step(&mut self, now: f32) {
        if self.started_at.is_some() && !self.is_active(now) {
            self.started_at = None;
        }
    }
}

impl Default for DamageFlash {
    fn default() -> Self {
        Self::new(FlashConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flash() -> DamageFlash {
        DamageFlash::new(FlashConfig {
            flash_count: 2,
            flash_duration: 0.25,
        })
    }

    #[test]
    fn test_blink_pattern() {
        let mut flash = flash();
        assert!(!flash.is_lit(0.0));

        flash.trigger(1.0);
        assert!(flash.is_lit(1.0));
        assert!(!flash.is_lit(1.25));
        assert!(flash.is_lit(1.5));
        assert!(!flash.is_lit(1.75));
        assert!(!flash.is_active(2.0));
        assert!(!flash.is_lit(2.0));
    }

    #[test]
    fn test_retrigger_restarts() {
        let mut flash = flash();
        flash.trigger(0.0);
        flash.trigger(0.9);
        assert!(flash.is_active(1.5));
        assert!(flash.is_lit(1.4));
    }

    #[test]
    fn test_step_clears_finished_sequence() {
        let mut flash = flash();
        flash.trigger(0.0);
        flash.step(0.5);
        assert!(flash.is_active(0.5));
        flash.step(5.0);
        assert!(!flash.is_active(0.1));
    }
}
