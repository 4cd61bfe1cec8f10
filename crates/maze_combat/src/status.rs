//! Status effects (poison damage-over-time)
//!
//! An entity holds at most one poison. Reapplying refreshes the timers
//! and never sums durations.

use crate::health::Health;
use serde::{Deserialize, Serialize};

/// Parameters of a poison application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoisonSpec {
    /// Damage applied on each tick
    pub per_tick: f32,
    /// Seconds between ticks
    pub tick_interval: f32,
    /// Total lifetime of the effect in seconds
    pub duration: f32,
}

impl PoisonSpec {
    pub fn new(per_tick: f32, tick_interval: f32, duration: f32) -> Self {
        Self {
            per_tick,
            tick_interval,
            duration,
        }
    }
}

impl Default for PoisonSpec {
    fn default() -> Self {
        Self::new(5.0, 1.0, 5.0)
    }
}

/// An active poison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poison {
    pub spec: PoisonSpec,
    /// Seconds left before the effect wears off
    pub remaining: f32,
    /// Clock time of the next tick
    pub next_tick_at: f32,
    applied_at: f32,
    ticks: u32,
}

impl Poison {
    fn start(spec: PoisonSpec, now: f32) -> Self {
        Self {
            spec,
            remaining: spec.duration,
            next_tick_at: now + spec.tick_interval,
            applied_at: now,
            ticks: 0,
        }
    }

    /// Clock time at which the effect wears off
    pub fn ends_at(&self) -> f32 {
        self.applied_at + self.spec.duration
    }

    // Ticks are scheduled from the application time so the last tick and
    // the end of the lifetime land on the same clock value.
    fn schedule_next(&mut self) {
        self.ticks += 1;
        self.next_tick_at = self.applied_at + (self.ticks + 1) as f32 * self.spec.tick_interval;
    }
}

/// What a status step did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusTick {
    /// Damage dealt by ticks this step
    pub damage_dealt: f32,
    /// Whether a tick fired this step
    pub ticked: bool,
    /// Whether the effect ended this step
    pub expired: bool,
}

/// Status-effect slot of an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusEffects {
    poison: Option<Poison>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poison the owner, or refresh the running poison.
    ///
    /// A refresh replaces the parameters, resets `remaining` to the new
    /// duration and reschedules the next tick from `now`.
    pub fn apply_poison(&mut self, spec: PoisonSpec, now: f32) {
        if spec.tick_interval <= 0.0 {
            log::warn!("ignoring poison with non-positive tick interval {}", spec.tick_interval);
            return;
        }

        if self.poison.is_some() {
            log::debug!("poison refreshed, duration reset to {}s", spec.duration);
        } else {
            log::debug!(
                "poisoned: {} damage every {}s for {}s",
                spec.per_tick,
                spec.tick_interval,
                spec.duration
            );
        }
        self.poison = Some(Poison::start(spec, now));
    }

    pub fn poison(&self) -> Option<&Poison> {
        self.poison.as_ref()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison.is_some()
    }

    /// Remove every effect
    pub fn clear(&mut self) {
        self.poison = None;
    }

    /// Advance effects to clock time `now`.
    ///
    /// Only time since application counts against the lifetime, so a poison
    /// applied earlier in the same frame is not charged for it. A dead owner
    /// ends the poison before any tick. At most one tick fires per step; when
    /// the clock has run past several tick times the schedule advances by a
    /// single interval, so large steps under-tick.
    pub fn step(&mut self, now: f32, health: &mut Health) -> StatusTick {
        let Some(poison) = self.poison.as_mut() else {
            return StatusTick::default();
        };

        if !health.is_alive() {
            self.poison = None;
            return StatusTick {
                expired: true,
                ..Default::default()
            };
        }

        let mut tick = StatusTick::default();
        poison.remaining = poison.ends_at() - now;

        if now >= poison.next_tick_at {
            let (dealt, _) = health.take_damage(poison.spec.per_tick);
            poison.schedule_next();
            tick.damage_dealt = dealt;
            tick.ticked = true;
            log::debug!("poison tick: {} damage ({:.1}s left)", dealt, poison.remaining.max(0.0));
        }

        if poison.remaining <= 0.0 {
            log::debug!("poison wore off");
            self.poison = None;
            tick.expired = true;
        }

        tick
    }
}
