//! Collision layers and masks

use serde::{Deserialize, Serialize};

/// A collision layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Default layer
    pub const DEFAULT: Self = Self(0);
    /// Player layer
    pub const PLAYER: Self = Self(1);
    /// Turrets and other hostile fixtures
    pub const ENEMIES: Self = Self(2);
    /// Projectile layer
    pub const PROJECTILES: Self = Self(3);
    /// Hazards and other trigger volumes
    pub const TRIGGERS: Self = Self(4);
    /// Walls and static level geometry
    pub const ENVIRONMENT: Self = Self(5);
    /// Coins and other pickups
    pub const PICKUPS: Self = Self(6);
    /// Forest trees
    pub const FOLIAGE: Self = Self(7);

    /// Get the layer as a bitmask
    pub const fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

impl Default for CollisionLayer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Set of layers a collider interacts with or a query accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    /// Every layer
    pub const ALL: Self = Self(u32::MAX);
    /// No layer
    pub const NONE: Self = Self(0);

    /// Build a mask from a list of layers
    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        Self(layers.iter().fold(0u32, |acc, l| acc | l.as_mask()))
    }

    /// Check whether a layer is part of the mask
    pub const fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.as_mask() != 0
    }

    /// Add a layer
    pub fn with(mut self, layer: CollisionLayer) -> Self {
        self.0 |= layer.as_mask();
        self
    }

    /// Remove a layer
    pub fn without(mut self, layer: CollisionLayer) -> Self {
        self.0 &= !layer.as_mask();
        self
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_membership() {
        let mask = CollisionMask::from_layers(&[CollisionLayer::PLAYER, CollisionLayer::ENVIRONMENT]);
        assert!(mask.contains(CollisionLayer::PLAYER));
        assert!(mask.contains(CollisionLayer::ENVIRONMENT));
        assert!(!mask.contains(CollisionLayer::PICKUPS));

        let mask = CollisionMask::ALL.without(CollisionLayer::ENEMIES);
        assert!(!mask.contains(CollisionLayer::ENEMIES));
        assert!(mask.contains(CollisionLayer::PLAYER));
        assert!(CollisionMask::NONE.with(CollisionLayer::FOLIAGE).contains(CollisionLayer::FOLIAGE));
    }
}
