//! Projectiles fired by turrets

use crate::combatant::Combatant;
use crate::damage::TargetFilter;
use crate::status::PoisonSpec;
use glam::{Quat, Vec3};
use maze_core::{Capabilities, EntityId};
use maze_physics::{ContactKind, ContactPhase};
use serde::{Deserialize, Serialize};

/// How the projectile's collider interacts with the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileBody {
    /// Sensor volume: passes through anything that is not a target
    Trigger,
    /// Solid body: any collision ends the flight
    Physical,
}

impl Default for ProjectileBody {
    fn default() -> Self {
        Self::Trigger
    }
}

/// Projectile template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Units per second
    pub speed: f32,
    /// Seconds before the projectile removes itself
    pub lifetime: f32,
    /// Direct damage on hit
    pub damage: f32,
    /// Poison applied on hit, if any
    pub poison: Option<PoisonSpec>,
    pub target: TargetFilter,
    pub body: ProjectileBody,
    /// Collider radius
    pub radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 20.0,
            lifetime: 5.0,
            damage: 15.0,
            poison: Some(PoisonSpec::default()),
            target: TargetFilter::default(),
            body: ProjectileBody::Trigger,
            radius: 0.2,
        }
    }
}

impl ProjectileConfig {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_poison(mut self, poison: Option<PoisonSpec>) -> Self {
        self.poison = poison;
        self
    }

    pub fn with_body(mut self, body: ProjectileBody) -> Self {
        self.body = body;
        self
    }
}

/// Result of advancing a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStep {
    /// Still flying
    Flying,
    /// Lifetime ran out; the owner should destroy it
    Expired,
}

/// Result of a contact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactOutcome {
    /// Damage was applied to the other side
    pub hit: bool,
    /// The projectile is spent and should be destroyed
    pub destroy: bool,
}

/// A projectile in flight.
///
/// Homes on its target: every step the heading is recomputed from the
/// target's live position. If the target disappears the last heading is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub config: ProjectileConfig,
    pub position: Vec3,
    pub velocity: Vec3,
    pub target: Option<EntityId>,
    expires_at: f32,
    spent: bool,
}

impl Projectile {
    /// Launch from `origin`. Heads for `target_position` when known,
    /// otherwise along the forward axis of `rotation`.
    pub fn spawn(
        config: ProjectileConfig,
        origin: Vec3,
        rotation: Quat,
        target: Option<EntityId>,
        target_position: Option<Vec3>,
        now: f32,
    ) -> Self {
        let direction = target_position
            .and_then(|p| (p - origin).try_normalize())
            .unwrap_or_else(|| (rotation * Vec3::Z).normalize_or_zero());

        Self {
            config,
            position: origin,
            velocity: direction * config.speed,
            target,
            expires_at: now + config.lifetime,
            spent: false,
        }
    }

    pub fn expires_at(&self) -> f32 {
        self.expires_at
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Advance one step. `target_position` is the target's position this
    /// step, or `None` if it no longer exists.
    pub fn step(&mut self, now: f32, dt: f32, target_position: Option<Vec3>) -> ProjectileStep {
        if self.spent || now >= self.expires_at {
            self.spent = true;
            return ProjectileStep::Expired;
        }

        if let Some(dir) = target_position.and_then(|p| (p - self.position).try_normalize()) {
            self.velocity = dir * self.config.speed;
        }
        self.position += self.velocity * dt;
        ProjectileStep::Flying
    }

    /// Handle the start of a contact with another entity.
    ///
    /// Trigger contacts only matter for qualifying targets. A solid
    /// collision ends the flight whatever was hit.
    pub fn on_contact(
        &mut self,
        phase: ContactPhase,
        kind: ContactKind,
        other: Capabilities,
        combatant: Option<&mut Combatant>,
        now: f32,
    ) -> ContactOutcome {
        if self.spent || phase != ContactPhase::Enter {
            return ContactOutcome::default();
        }

        let qualifies = self.config.target.matches(other);
        if kind == ContactKind::Trigger && !qualifies {
            return ContactOutcome::default();
        }

        let mut outcome = ContactOutcome {
            hit: false,
            destroy: true,
        };

        if qualifies {
            if let Some(target) = combatant {
                target.take_damage(self.config.damage, now);
                log::debug!("projectile hit for {} damage", self.config.damage);
                if let Some(poison) = self.config.poison {
                    target.apply_poison(poison, now);
                }
                outcome.hit = true;
            }
        }

        self.spent = true;
        outcome
    }
}
