//! Combat record of a damageable entity

use crate::flash::DamageFlash;
use crate::health::Health;
use crate::status::{PoisonSpec, StatusEffects, StatusTick};

/// Everything combat-related an entity owns.
///
/// Dropping it drops the health listeners and any running poison with it,
/// so a destroyed entity cannot keep ticking.
#[derive(Debug, Default)]
pub struct Combatant {
    pub health: Health,
    pub status: StatusEffects,
    pub flash: Option<DamageFlash>,
}

impl Combatant {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Health::new(max_health),
            status: StatusEffects::new(),
            flash: None,
        }
    }

    pub fn with_flash(mut self, flash: DamageFlash) -> Self {
        self.flash = Some(flash);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Apply direct damage, blinking if anything landed on a live target
    pub fn take_damage(&mut self, amount: f32, now: f32) -> (f32, bool) {
        let was_alive = self.health.is_alive();
        let result = self.health.take_damage(amount);
        if was_alive {
            self.blink(now);
        }
        result
    }

    pub fn apply_poison(&mut self, spec: PoisonSpec, now: f32) {
        self.status.apply_poison(spec, now);
    }

    /// Advance status effects and feedback to clock time `now`
    pub fn step(&mut self, now: f32) -> StatusTick {
        let tick = self.status.step(now, &mut self.health);
        if tick.ticked {
            self.blink(now);
        }
        if let Some(flash) = self.flash.as_mut() {
            flash.step(now);
        }
        tick
    }

    /// Restart the damage flash, if the entity has one
    pub fn blink(&mut self, now: f32) {
        if let Some(flash) = self.flash.as_mut() {
            flash.trigger(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_triggers_flash() {
        let mut target = Combatant::new(100.0).with_flash(DamageFlash::default());
        target.take_damage(10.0, 2.0);
        assert!(target.flash.unwrap().is_lit(2.0));
    }

    #[test]
    fn test_poison_tick_triggers_flash() {
        let mut target = Combatant::new(100.0).with_flash(DamageFlash::default());
        target.apply_poison(PoisonSpec::new(5.0, 1.0, 3.0), 0.0);

        target.step(0.5);
        assert!(!target.flash.unwrap().is_active(0.5));

        let tick = target.step(1.0);
        assert!(tick.ticked);
        assert!(target.flash.unwrap().is_lit(1.0));
        assert_eq!(target.health.current(), 95.0);
    }

    #[test]
    fn test_dead_target_does_not_blink() {
        let mut target = Combatant::new(10.0).with_flash(DamageFlash::default());
        target.take_damage(10.0, 0.0);
        target.step(5.0);
        target.take_damage(10.0, 6.0);
        assert!(!target.flash.unwrap().is_active(6.0));
    }
}
