//! Typed entity classification
//!
//! Entities declare what they are once, at creation. Damage sources,
//! turrets and collectors match on these flags instead of comparing
//! tag strings on every contact.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single classification an entity can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The player character
    Player,
    /// Owns a health record and can be hurt
    Damageable,
    /// Can be picked up by a collector
    Collectible,
    /// A coin pickup
    Coin,
    /// A generated forest tree
    Tree,
    /// Walkable maze floor tile
    FloorTile,
    /// Static level geometry that blocks line of sight
    Obstacle,
    /// A turret
    Turret,
    /// A fired projectile
    Projectile,
    /// Contact-damage hazard (spikes, traps)
    Hazard,
}

impl Capability {
    #[inline]
    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Set of capabilities packed into a bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities(u32);

impl Capabilities {
    /// No capabilities
    pub const NONE: Self = Self(0);

    /// Create an empty set
    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Add a capability
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Insert in place
    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    /// Remove in place
    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    /// Check membership
    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<Capability> for Capabilities {
    fn from(capability: Capability) -> Self {
        Self::empty().with(capability)
    }
}

impl<const N: usize> From<[Capability; N]> for Capabilities {
    fn from(capabilities: [Capability; N]) -> Self {
        capabilities.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Capabilities of every live entity
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: BTreeMap<EntityId, Capabilities>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an entity's capabilities
    pub fn insert(&mut self, entity: EntityId, capabilities: impl Into<Capabilities>) {
        self.entries.insert(entity, capabilities.into());
    }

    /// Forget an entity
    pub fn remove(&mut self, entity: EntityId) -> Option<Capabilities> {
        self.entries.remove(&entity)
    }

    /// Capabilities of an entity, empty if unknown
    pub fn get(&self, entity: EntityId) -> Capabilities {
        self.entries.get(&entity).copied().unwrap_or_default()
    }

    /// Check whether an entity carries a capability
    pub fn has(&self, entity: EntityId, capability: Capability) -> bool {
        self.get(entity).contains(capability)
    }

    /// First entity (lowest id) carrying a capability
    pub fn find_first(&self, capability: Capability) -> Option<EntityId> {
        self.entries
            .iter()
            .find(|(_, caps)| caps.contains(capability))
            .map(|(id, _)| *id)
    }

    /// All entities carrying a capability, in id order
    pub fn find_all(&self, capability: Capability) -> impl Iterator<Item = EntityId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, caps)| caps.contains(capability))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_set() {
        let mut caps = Capabilities::from([Capability::Player, Capability::Damageable]);
        assert!(caps.contains(Capability::Player));
        assert!(caps.contains(Capability::Damageable));
        assert!(!caps.contains(Capability::Coin));

        caps.remove(Capability::Player);
        assert!(!caps.contains(Capability::Player));
        caps.insert(Capability::Coin);
        assert!(caps.contains(Capability::Coin));
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = CapabilityRegistry::new();
        let tree = EntityId::new(0, 0);
        let player = EntityId::new(1, 0);
        let coin = EntityId::new(2, 0);
        let other_tree = EntityId::new(3, 0);

        registry.insert(tree, Capability::Tree);
        registry.insert(player, [Capability::Player, Capability::Damageable]);
        registry.insert(coin, [Capability::Coin, Capability::Collectible]);
        registry.insert(other_tree, Capability::Tree);

        assert_eq!(registry.find_first(Capability::Player), Some(player));
        assert_eq!(
            registry.find_all(Capability::Tree).collect::<Vec<_>>(),
            vec![tree, other_tree]
        );
        assert!(registry.has(coin, Capability::Collectible));

        registry.remove(player);
        assert_eq!(registry.find_first(Capability::Player), None);
        assert!(registry.get(player).is_empty());
    }
}
