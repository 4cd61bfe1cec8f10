//! Contact tracking
//!
//! Turns per-step overlap state into enter / stay / exit events, the same
//! way a host engine reports trigger and collision callbacks.

use crate::events::{ContactEvent, ContactKind, ContactPhase};
use crate::world::ColliderWorld;
use maze_core::EntityId;
use std::collections::BTreeMap;

type Pair = (EntityId, EntityId);

/// Remembers which collider pairs overlapped on the previous update
#[derive(Debug, Default)]
pub struct ContactTracker {
    active: BTreeMap<Pair, ContactKind>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute this step's contact events.
    ///
    /// Only pairs with at least one dynamic collider are tested. Events are
    /// ordered by pair, exits last.
    pub fn update(&mut self, world: &ColliderWorld) -> Vec<ContactEvent> {
        let mut current: BTreeMap<Pair, ContactKind> = BTreeMap::new();

        for (id_a, a) in world.iter().filter(|(_, c)| c.is_enabled() && c.desc.dynamic) {
            for (id_b, b) in world.iter().filter(|(_, c)| c.is_enabled()) {
                if id_a == id_b || (b.desc.dynamic && id_b < id_a) {
                    continue;
                }
                if !a.interacts_with(b) || !a.overlaps(b) {
                    continue;
                }
                let kind = if a.desc.sensor || b.desc.sensor {
                    ContactKind::Trigger
                } else {
                    ContactKind::Collision
                };
                current.insert(ordered(id_a, id_b), kind);
            }
        }

        let mut events = Vec::with_capacity(current.len());
        for (&(a, b), &kind) in &current {
            let phase = if self.active.contains_key(&(a, b)) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            events.push(ContactEvent::new(a, b, phase, kind));
        }
        for (&(a, b), &kind) in &self.active {
            if !current.contains_key(&(a, b)) {
                events.push(ContactEvent::new(a, b, ContactPhase::Exit, kind));
            }
        }

        if !events.is_empty() {
            log::trace!("{} contact events, {} pairs touching", events.len(), current.len());
        }
        self.active = current;
        events
    }

    /// Drop every remembered contact involving an entity without emitting exits
    pub fn forget(&mut self, entity: EntityId) {
        self.active.retain(|(a, b), _| *a != entity && *b != entity);
    }

    /// Number of pairs currently touching
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

fn ordered(a: EntityId, b: EntityId) -> Pair {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{CollisionLayer, CollisionMask};
    use crate::world::ColliderDesc;
    use glam::Vec3;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_enter_stay_exit() {
        let mut world = ColliderWorld::new();
        let mover = id(1);
        let spikes = id(2);
        world.insert(mover, ColliderDesc::ball(0.5).at(Vec3::new(-5.0, 0.0, 0.0)).dynamic());
        world.insert(spikes, ColliderDesc::cuboid(Vec3::splat(1.0)).sensor());

        let mut tracker = ContactTracker::new();
        assert!(tracker.update(&world).is_empty());

        world.set_position(mover, Vec3::ZERO);
        let events = tracker.update(&world);
        assert_eq!(events, vec![ContactEvent::new(mover, spikes, ContactPhase::Enter, ContactKind::Trigger)]);

        let events = tracker.update(&world);
        assert_eq!(events[0].phase, ContactPhase::Stay);

        world.set_position(mover, Vec3::new(5.0, 0.0, 0.0));
        let events = tracker.update(&world);
        assert_eq!(events, vec![ContactEvent::new(mover, spikes, ContactPhase::Exit, ContactKind::Trigger)]);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_removed_collider_exits() {
        let mut world = ColliderWorld::new();
        world.insert(id(1), ColliderDesc::ball(1.0).dynamic());
        world.insert(id(2), ColliderDesc::ball(1.0));

        let mut tracker = ContactTracker::new();
        let events = tracker.update(&world);
        assert_eq!(events[0].kind, ContactKind::Collision);

        world.remove(id(2));
        let events = tracker.update(&world);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_exit());
    }

    #[test]
    fn test_static_pairs_and_layer_filter() {
        let mut world = ColliderWorld::new();
        // Two static colliders never produce contacts
        world.insert(id(1), ColliderDesc::ball(1.0));
        world.insert(id(2), ColliderDesc::ball(1.0));
        // A projectile that ignores the enemy layer
        world.insert(
            id(3),
            ColliderDesc::ball(0.2)
                .dynamic()
                .with_layer(CollisionLayer::PROJECTILES)
                .with_collides_with(CollisionMask::ALL.without(CollisionLayer::ENEMIES)),
        );
        world.insert(id(4), ColliderDesc::ball(1.0).with_layer(CollisionLayer::ENEMIES));

        let mut tracker = ContactTracker::new();
        let events = tracker.update(&world);
        let pairs: Vec<_> = events.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(id(1), id(3)), (id(2), id(3))]);
    }

    #[test]
    fn test_two_dynamic_colliders_reported_once() {
        let mut world = ColliderWorld::new();
        world.insert(id(1), ColliderDesc::ball(1.0).dynamic());
        world.insert(id(2), ColliderDesc::ball(1.0).dynamic());

        let mut tracker = ContactTracker::new();
        assert_eq!(tracker.update(&world).len(), 1);
    }
}
