//! Turret: perceive, aim, fire
//!
//! Each step runs the whole pipeline for one turret before anything else
//! observes it: range check, line of sight, rotation, then the fire gate.

use crate::perception::line_of_sight;
use glam::{Quat, Vec3};
use maze_combat::ProjectileConfig;
use maze_core::{look_rotation, Capability, CapabilityRegistry, EntityId};
use maze_physics::{CollisionMask, SpatialQuery};
use serde::{Deserialize, Serialize};

/// Turret settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Targets further than this are ignored
    pub detection_range: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    /// Slerp factor per second
    pub rotation_speed: f32,
    /// Only yaw towards the target
    pub horizontal_only: bool,
    pub require_line_of_sight: bool,
    /// Layers that can block line of sight
    pub obstacle_mask: CollisionMask,
    /// Capability the turret looks for when acquiring its target
    pub target: Capability,
    /// Muzzle position relative to the turret, in turret space
    pub fire_point: Vec3,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            fire_interval: 2.0,
            rotation_speed: 5.0,
            horizontal_only: true,
            require_line_of_sight: true,
            obstacle_mask: CollisionMask::ALL,
            target: Capability::Player,
            fire_point: Vec3::ZERO,
        }
    }
}

impl TurretConfig {
    pub fn with_detection_range(mut self, range: f32) -> Self {
        self.detection_range = range;
        self
    }

    pub fn with_fire_interval(mut self, interval: f32) -> Self {
        self.fire_interval = interval;
        self
    }

    pub fn with_rotation_speed(mut self, speed: f32) -> Self {
        self.rotation_speed = speed;
        self
    }

    pub fn with_line_of_sight(mut self, required: bool) -> Self {
        self.require_line_of_sight = required;
        self
    }

    pub fn with_obstacle_mask(mut self, mask: CollisionMask) -> Self {
        self.obstacle_mask = mask;
        self
    }

    pub fn with_fire_point(mut self, offset: Vec3) -> Self {
        self.fire_point = offset;
        self
    }
}

/// Turret state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurretState {
    /// No target, or target out of range
    Idle,
    /// Target in range, turning towards it
    Tracking,
    /// Fired this step
    Firing,
}

/// Per-step inputs supplied by the host
pub struct TurretContext<'a> {
    pub now: f32,
    pub dt: f32,
    /// Live position of the acquired target, `None` once it is gone
    pub target_position: Option<Vec3>,
    pub query: &'a dyn SpatialQuery,
    /// The turret's own entity, ignored by line-of-sight rays
    pub owner: Option<EntityId>,
}

impl<'a> TurretContext<'a> {
    pub fn new(now: f32, dt: f32, query: &'a dyn SpatialQuery) -> Self {
        Self {
            now,
            dt,
            target_position: None,
            query,
            owner: None,
        }
    }

    pub fn with_target_position(mut self, position: Vec3) -> Self {
        self.target_position = Some(position);
        self
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Request to spawn a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireCommand {
    pub origin: Vec3,
    pub rotation: Quat,
    pub target: EntityId,
    pub target_position: Vec3,
    pub projectile: ProjectileConfig,
}

/// A stationary turret
#[derive(Debug, Clone)]
pub struct Turret {
    pub config: TurretConfig,
    pub position: Vec3,
    rotation: Quat,
    target: Option<EntityId>,
    projectile: Option<ProjectileConfig>,
    next_fire_at: f32,
    state: TurretState,
    line_of_sight: bool,
    warned_unarmed: bool,
}

impl Turret {
    pub fn new(config: TurretConfig, position: Vec3) -> Self {
        Self {
            config,
            position,
            rotation: Quat::IDENTITY,
            target: None,
            projectile: None,
            next_fire_at: 0.0,
            state: TurretState::Idle,
            line_of_sight: false,
            warned_unarmed: false,
        }
    }

    /// Set the projectile template. Without one the turret tracks but never fires.
    pub fn with_projectile(mut self, projectile: ProjectileConfig) -> Self {
        self.projectile = Some(projectile);
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Look up the target once. Later spawns are not picked up.
    pub fn acquire_target(&mut self, registry: &CapabilityRegistry) -> Option<EntityId> {
        self.target = registry.find_first(self.config.target);
        match self.target {
            Some(id) => log::debug!("turret acquired target {}", id),
            None => log::debug!("turret found no {:?} to track", self.config.target),
        }
        self.target
    }

    /// Assign a target directly
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn state(&self) -> TurretState {
        self.state
    }

    pub fn has_line_of_sight(&self) -> bool {
        self.line_of_sight
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Facing direction
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Time at which the next shot is allowed
    pub fn next_fire_at(&self) -> f32 {
        self.next_fire_at
    }

    /// World position of the muzzle
    pub fn fire_point(&self) -> Vec3 {
        self.position + self.rotation * self.config.fire_point
    }

    /// Run one step of the turret
    pub fn step(&mut self, ctx: &TurretContext<'_>) -> Option<FireCommand> {
        let (Some(target), Some(target_position)) = (self.target, ctx.target_position) else {
            self.set_state(TurretState::Idle);
            self.line_of_sight = false;
            return None;
        };

        if self.position.distance(target_position) > self.config.detection_range {
            self.set_state(TurretState::Idle);
            self.line_of_sight = false;
            return None;
        }

        self.line_of_sight = line_of_sight(
            ctx.query,
            self.fire_point(),
            target,
            target_position,
            self.config.obstacle_mask,
            ctx.owner,
        )
        .is_visible();

        self.rotate_towards(target_position, ctx.dt);

        let shot = if !self.config.require_line_of_sight || self.line_of_sight {
            self.try_fire(target, target_position, ctx.now)
        } else {
            None
        };

        self.set_state(if shot.is_some() {
            TurretState::Firing
        } else {
            TurretState::Tracking
        });
        shot
    }

    fn rotate_towards(&mut self, target_position: Vec3, dt: f32) {
        let mut direction = target_position - self.position;
        if self.config.horizontal_only {
            direction.y = 0.0;
        }
        if let Some(look) = look_rotation(direction) {
            let t = (self.config.rotation_speed * dt).clamp(0.0, 1.0);
            self.rotation = self.rotation.slerp(look, t);
        }
    }

    fn try_fire(&mut self, target: EntityId, target_position: Vec3, now: f32) -> Option<FireCommand> {
        let Some(projectile) = self.projectile else {
            if !self.warned_unarmed {
                log::warn!("turret at {} has no projectile template and will not fire", self.position);
                self.warned_unarmed = true;
            }
            return None;
        };

        if now < self.next_fire_at {
            return None;
        }

        self.next_fire_at = now + self.config.fire_interval;
        log::debug!("turret fires at {}", target);

        Some(FireCommand {
            origin: self.fire_point(),
            rotation: self.rotation,
            target,
            target_position,
            projectile,
        })
    }

    fn set_state(&mut self, state: TurretState) {
        if self.state != state {
            log::debug!("turret {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use maze_physics::{ColliderDesc, ColliderWorld};

    const PLAYER: EntityId = EntityId::new(1, 0);
    const WALL: EntityId = EntityId::new(2, 0);

    fn armed() -> Turret {
        let mut turret = Turret::new(TurretConfig::default(), Vec3::ZERO).with_projectile(ProjectileConfig::default());
        turret.set_target(Some(PLAYER));
        turret
    }

    fn world_with_player(at: Vec3) -> ColliderWorld {
        let mut world = ColliderWorld::new();
        world.insert(PLAYER, ColliderDesc::ball(0.5).at(at));
        world
    }

    #[test]
    fn test_acquires_first_target_once() {
        let mut registry = CapabilityRegistry::new();
        registry.insert(EntityId::new(4, 0), Capability::Player);
        registry.insert(EntityId::new(7, 0), Capability::Player);

        let mut turret = Turret::new(TurretConfig::default(), Vec3::ZERO);
        assert_eq!(turret.acquire_target(&registry), Some(EntityId::new(4, 0)));
    }

    #[test]
    fn test_idle_without_target() {
        let world = ColliderWorld::new();
        let mut turret = Turret::new(TurretConfig::default(), Vec3::ZERO).with_projectile(ProjectileConfig::default());
        let ctx = TurretContext::new(0.0, 0.1, &world).with_target_position(Vec3::Z);
        assert!(turret.step(&ctx).is_none());
        assert_eq!(turret.state(), TurretState::Idle);
    }

    #[test]
    fn test_out_of_range_then_in_range() {
        let far = Vec3::new(20.0, 0.0, 0.0);
        let near = Vec3::new(10.0, 0.0, 0.0);
        let mut turret = armed();

        let world = world_with_player(far);
        let ctx = TurretContext::new(0.0, 0.1, &world).with_target_position(far);
        assert!(turret.step(&ctx).is_none());
        assert_eq!(turret.state(), TurretState::Idle);
        assert_eq!(turret.rotation(), Quat::IDENTITY);

        let world = world_with_player(near);
        let ctx = TurretContext::new(0.1, 0.1, &world).with_target_position(near);
        let shot = turret.step(&ctx).expect("fires once in range");
        assert_eq!(turret.state(), TurretState::Firing);
        assert_eq!(shot.target, PLAYER);
        assert!(turret.rotation() != Quat::IDENTITY);
        assert_relative_eq!(turret.next_fire_at(), 2.1);

        // Cooling down: tracks without firing
        let ctx = TurretContext::new(1.0, 0.1, &world).with_target_position(near);
        assert!(turret.step(&ctx).is_none());
        assert_eq!(turret.state(), TurretState::Tracking);

        let ctx = TurretContext::new(2.5, 0.1, &world).with_target_position(near);
        assert!(turret.step(&ctx).is_some());
    }

    #[test]
    fn test_wall_blocks_fire() {
        let target = Vec3::new(0.0, 0.0, 10.0);
        let mut world = world_with_player(target);
        world.insert(WALL, ColliderDesc::cuboid(Vec3::new(3.0, 3.0, 0.5)).at(Vec3::new(0.0, 0.0, 5.0)));

        let mut turret = armed();
        let ctx = TurretContext::new(0.0, 0.1, &world).with_target_position(target);
        assert!(turret.step(&ctx).is_none());
        assert!(!turret.has_line_of_sight());
        assert_eq!(turret.state(), TurretState::Tracking);

        // Wall removed: the skipped shot happens on the next step
        world.remove(WALL);
        let ctx = TurretContext::new(0.1, 0.1, &world).with_target_position(target);
        assert!(turret.step(&ctx).is_some());
        assert!(turret.has_line_of_sight());
    }

    #[test]
    fn test_line_of_sight_optional() {
        let target = Vec3::new(0.0, 0.0, 10.0);
        let mut world = world_with_player(target);
        world.insert(WALL, ColliderDesc::cuboid(Vec3::new(3.0, 3.0, 0.5)).at(Vec3::new(0.0, 0.0, 5.0)));

        let mut turret = armed();
        turret.config = turret.config.with_line_of_sight(false);
        let ctx = TurretContext::new(0.0, 0.1, &world).with_target_position(target);
        assert!(turret.step(&ctx).is_some());
    }

    #[test]
    fn test_unarmed_turret_tracks_only() {
        let target = Vec3::new(5.0, 0.0, 0.0);
        let world = world_with_player(target);
        let mut turret = Turret::new(TurretConfig::default(), Vec3::ZERO);
        turret.set_target(Some(PLAYER));

        for frame in 0..3 {
            let ctx = TurretContext::new(frame as f32, 0.1, &world).with_target_position(target);
            assert!(turret.step(&ctx).is_none());
        }
        assert_eq!(turret.state(), TurretState::Tracking);
    }

    #[test]
    fn test_horizontal_only_keeps_level() {
        let target = Vec3::new(0.0, 5.0, 5.0);
        let world = world_with_player(target);
        let mut turret = armed();
        turret.config = turret.config.with_rotation_speed(100.0);

        let ctx = TurretContext::new(0.0, 0.1, &world).with_target_position(target);
        turret.step(&ctx);
        assert_relative_eq!(turret.forward().y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(turret.forward().z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_converges() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let world = world_with_player(target);
        let mut turret = armed();

        for frame in 0..120 {
            let ctx = TurretContext::new(frame as f32 / 60.0, 1.0 / 60.0, &world).with_target_position(target);
            turret.step(&ctx);
        }
        assert_relative_eq!(turret.forward().x, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_target_gone_goes_idle() {
        let world = ColliderWorld::new();
        let mut turret = armed();
        let ctx = TurretContext::new(0.0, 0.1, &world);
        assert!(turret.step(&ctx).is_none());
        assert_eq!(turret.state(), TurretState::Idle);
    }
}
