//! Contact damage sources (spikes, traps, hazardous walls)

use crate::health::Health;
use maze_core::{Capabilities, Capability};
use maze_physics::ContactPhase;
use serde::{Deserialize, Serialize};

/// Which entities a damage source is allowed to hurt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    /// Capability the target must carry
    pub required: Capability,
}

impl TargetFilter {
    pub fn new(required: Capability) -> Self {
        Self { required }
    }

    pub fn matches(&self, target: Capabilities) -> bool {
        target.contains(self.required)
    }
}

impl Default for TargetFilter {
    fn default() -> Self {
        Self::new(Capability::Player)
    }
}

/// Settings of a contact damage source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDamageConfig {
    /// Damage per application
    pub damage: f32,
    /// Keep hurting while the contact persists
    pub continuous: bool,
    /// Minimum seconds between two applications
    pub damage_interval: f32,
    pub target: TargetFilter,
}

impl Default for ContactDamageConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            continuous: false,
            damage_interval: 0.5,
            target: TargetFilter::default(),
        }
    }
}

impl ContactDamageConfig {
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn continuous(mut self, interval: f32) -> Self {
        self.continuous = true;
        self.damage_interval = interval;
        self
    }

    pub fn with_target(mut self, target: Capability) -> Self {
        self.target = TargetFilter::new(target);
        self
    }
}

/// Damage applied on touch.
///
/// The cooldown is tracked per source, not per target: two targets touching
/// the same hazard share one damage interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDamage {
    pub config: ContactDamageConfig,
    /// Clock time of the last successful application
    last_damage_at: Option<f32>,
}

impl ContactDamage {
    pub fn new(config: ContactDamageConfig) -> Self {
        Self {
            config,
            last_damage_at: None,
        }
    }

    pub fn last_damage_at(&self) -> Option<f32> {
        self.last_damage_at
    }

    /// Handle a contact with a target.
    ///
    /// Enter always tries to hurt; stay only in continuous mode; exit never.
    /// Returns the damage dealt, or `None` when filtered, cooling down, or
    /// the target has no health record.
    pub fn on_contact(
        &mut self,
        phase: ContactPhase,
        now: f32,
        target: Capabilities,
        health: Option<&mut Health>,
    ) -> Option<f32> {
        match phase {
            ContactPhase::Enter => {}
            ContactPhase::Stay if self.config.continuous => {}
            _ => return None,
        }

        if !self.config.target.matches(target) {
            return None;
        }

        if let Some(last) = self.last_damage_at {
            if now - last < self.config.damage_interval {
                return None;
            }
        }

        let health = health?;
        let (dealt, _) = health.take_damage(self.config.damage);
        self.last_damage_at = Some(now);
        log::debug!("contact damage: {} ({:?})", dealt, phase);
        Some(dealt)
    }
}

impl Default for ContactDamage {
    fn default() -> Self {
        Self::new(ContactDamageConfig::default())
    }
}
