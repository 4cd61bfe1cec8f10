//! Proximity activation of static colliders
//!
//! Keeps collision cost bounded near the player: only colliders within
//! `radius` of the tracked subject stay enabled. The check runs every
//! `poll_interval` seconds rather than every step, and only colliders whose
//! state actually changes are touched.

use glam::Vec3;
use maze_core::EntityId;
use maze_physics::ColliderToggle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    pub radius: f32,
    /// Seconds between two polls
    pub poll_interval: f32,
    /// Seconds to wait after start-up before collecting colliders
    pub collect_delay: f32,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            poll_interval: 0.2,
            collect_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Managed {
    entity: EntityId,
    position: Vec3,
    enabled: bool,
}

/// Toggles colliders on and off by distance to a subject
#[derive(Debug, Clone)]
pub struct ProximityActivator {
    pub config: ActivationConfig,
    managed: Vec<Managed>,
    next_poll_at: f32,
    collect_at: Option<f32>,
}

impl ProximityActivator {
    pub fn new(config: ActivationConfig) -> Self {
        Self {
            config,
            managed: Vec::new(),
            next_poll_at: 0.0,
            collect_at: None,
        }
    }

    /// Arrange for collection `collect_delay` seconds after `now`
    pub fn schedule_collect(&mut self, now: f32) {
        self.collect_at = Some(now + self.config.collect_delay);
    }

    /// Whether a scheduled collection is due. Clears the schedule when it is.
    pub fn take_due_collect(&mut self, now: f32) -> bool {
        match self.collect_at {
            Some(at) if now >= at => {
                self.collect_at = None;
                true
            }
            _ => false,
        }
    }

    /// Take over a set of colliders, replacing any previous set.
    ///
    /// Every collected collider starts disabled; the next poll enables the
    /// ones in range. Entities without a collider are skipped.
    pub fn collect<T>(&mut self, entries: impl IntoIterator<Item = (EntityId, Vec3)>, colliders: &mut T) -> usize
    where
        T: ColliderToggle + ?Sized,
    {
        self.managed.clear();
        for (entity, position) in entries {
            if colliders.set_enabled(entity, false) {
                self.managed.push(Managed {
                    entity,
                    position,
                    enabled: false,
                });
            }
        }
        log::info!("proximity activation managing {} colliders", self.managed.len());
        self.managed.len()
    }

    /// Poll if due. Returns how many colliders were flipped.
    pub fn step<T>(&mut self, now: f32, subject: Option<Vec3>, colliders: &mut T) -> usize
    where
        T: ColliderToggle + ?Sized,
    {
        let Some(subject) = subject else {
            return 0;
        };
        if self.managed.is_empty() || now < self.next_poll_at {
            return 0;
        }
        self.next_poll_at = now + self.config.poll_interval;

        let radius_sq = self.config.radius * self.config.radius;
        let mut flips = 0;
        for entry in &mut self.managed {
            // Live collider state wins over the cached flag
            let Some(current) = colliders.is_enabled(entry.entity) else {
                continue;
            };
            entry.enabled = current;

            let wanted = entry.position.distance_squared(subject) <= radius_sq;
            if wanted != current && colliders.set_enabled(entry.entity, wanted) {
                entry.enabled = wanted;
                flips += 1;
            }
        }

        if flips > 0 {
            log::debug!("proximity activation flipped {} colliders", flips);
        }
        flips
    }

    /// Stop managing an entity (it was destroyed)
    pub fn forget(&mut self, entity: EntityId) -> bool {
        let before = self.managed.len();
        self.managed.retain(|m| m.entity != entity);
        self.managed.len() != before
    }

    /// `None` if the entity is not managed
    pub fn is_enabled(&self, entity: EntityId) -> Option<bool> {
        self.managed.iter().find(|m| m.entity == entity).map(|m| m.enabled)
    }

    pub fn managed_count(&self) -> usize {
        self.managed.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.managed.iter().filter(|m| m.enabled).count()
    }

    pub fn clear(&mut self) {
        self.managed.clear();
        self.collect_at = None;
        self.next_poll_at = 0.0;
    }
}

impl Default for ProximityActivator {
    fn default() -> Self {
        Self::new(ActivationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_physics::{ColliderDesc, ColliderWorld};

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    /// Trees along the x axis at 0, 5, 10, ... 45
    fn row_of_trees() -> (ColliderWorld, Vec<(EntityId, Vec3)>) {
        let mut world = ColliderWorld::new();
        let entries: Vec<_> = (0..10)
            .map(|i| (id(i), Vec3::new(i as f32 * 5.0, 0.0, 0.0)))
            .collect();
        for (entity, position) in &entries {
            world.insert(*entity, ColliderDesc::ball(0.5).at(*position));
        }
        (world, entries)
    }

    /// Toggle wrapper that counts writes
    struct Counting<'a> {
        inner: &'a mut ColliderWorld,
        writes: usize,
    }

    impl ColliderToggle for Counting<'_> {
        fn set_enabled(&mut self, entity: EntityId, enabled: bool) -> bool {
            self.writes += 1;
            self.inner.set_enabled(entity, enabled)
        }

        fn is_enabled(&self, entity: EntityId) -> Option<bool> {
            self.inner.is_enabled(entity)
        }
    }

    #[test]
    fn test_collect_disables_everything() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();

        assert_eq!(activator.collect(entries, &mut world), 10);
        assert_eq!(world.enabled_count(), 0);
        assert_eq!(activator.enabled_count(), 0);
    }

    #[test]
    fn test_collect_skips_entities_without_collider() {
        let (mut world, mut entries) = row_of_trees();
        entries.push((id(99), Vec3::ZERO));
        let mut activator = ProximityActivator::default();
        assert_eq!(activator.collect(entries, &mut world), 10);
        assert_eq!(activator.is_enabled(id(99)), None);
    }

    #[test]
    fn test_enables_within_radius() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);

        // Radius 10 around x=12: trees at 5, 10, 15, 20
        let flips = activator.step(0.0, Some(Vec3::new(12.0, 0.0, 0.0)), &mut world);
        assert_eq!(flips, 4);
        assert_eq!(world.enabled_count(), 4);
        assert_eq!(activator.is_enabled(id(1)), Some(true));
        assert_eq!(activator.is_enabled(id(0)), Some(false));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);

        activator.step(0.0, Some(Vec3::ZERO), &mut world);
        assert_eq!(activator.is_enabled(id(2)), Some(true));
        assert_eq!(activator.is_enabled(id(3)), Some(false));
    }

    #[test]
    fn test_polls_only_on_interval() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);

        assert!(activator.step(0.0, Some(Vec3::ZERO), &mut world) > 0);
        // Subject jumps, but the next poll is not due yet
        assert_eq!(activator.step(0.1, Some(Vec3::new(45.0, 0.0, 0.0)), &mut world), 0);
        assert_eq!(activator.is_enabled(id(9)), Some(false));

        assert!(activator.step(0.2, Some(Vec3::new(45.0, 0.0, 0.0)), &mut world) > 0);
        assert_eq!(activator.is_enabled(id(9)), Some(true));
        assert_eq!(activator.is_enabled(id(0)), Some(false));
    }

    #[test]
    fn test_only_flips_are_written() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);
        activator.step(0.0, Some(Vec3::ZERO), &mut world);

        let mut counting = Counting {
            inner: &mut world,
            writes: 0,
        };
        // Same subject position: nothing changes, nothing is written
        assert_eq!(activator.step(1.0, Some(Vec3::ZERO), &mut counting), 0);
        assert_eq!(counting.writes, 0);

        // Two more trees come into range: two flips, two writes
        assert_eq!(activator.step(2.0, Some(Vec3::new(10.0, 0.0, 0.0)), &mut counting), 2);
        assert_eq!(counting.writes, 2);
    }

    #[test]
    fn test_outside_toggles_are_reconciled() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);
        activator.step(0.0, Some(Vec3::ZERO), &mut world);

        // Toggled behind the activator's back between polls
        world.set_enabled(id(1), false);
        world.set_enabled(id(8), true);

        let mut counting = Counting {
            inner: &mut world,
            writes: 0,
        };
        assert_eq!(activator.step(1.0, Some(Vec3::ZERO), &mut counting), 2);
        assert_eq!(counting.writes, 2);
        assert_eq!(world.is_enabled(id(1)), Some(true));
        assert_eq!(world.is_enabled(id(8)), Some(false));
        assert_eq!(activator.is_enabled(id(1)), Some(true));
        assert_eq!(activator.is_enabled(id(8)), Some(false));
        assert_eq!(world.enabled_count(), 3);
    }

    #[test]
    fn test_collect_schedule() {
        let mut activator = ProximityActivator::default();
        activator.schedule_collect(1.0);
        assert!(!activator.take_due_collect(1.2));
        assert!(activator.take_due_collect(1.5));
        assert!(!activator.take_due_collect(2.0));
    }

    #[test]
    fn test_missing_subject_is_inert() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);
        assert_eq!(activator.step(0.0, None, &mut world), 0);
        assert_eq!(world.enabled_count(), 0);
    }

    #[test]
    fn test_forget() {
        let (mut world, entries) = row_of_trees();
        let mut activator = ProximityActivator::default();
        activator.collect(entries, &mut world);
        assert!(activator.forget(id(3)));
        assert!(!activator.forget(id(3)));
        assert_eq!(activator.managed_count(), 9);
    }
}
