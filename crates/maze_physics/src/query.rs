//! Spatial queries (raycasting)

use crate::layers::CollisionMask;
use glam::Vec3;
use maze_core::EntityId;

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized (zero stays zero)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `from` towards `to`
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a raycast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Entity owning the collider that was hit
    pub entity: EntityId,
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Options for raycast queries
#[derive(Debug, Clone)]
pub struct RaycastOptions {
    /// Maximum distance for the ray
    pub max_distance: f32,
    /// Layers the ray can hit
    pub mask: CollisionMask,
    /// Entities to ignore (usually the caster itself)
    pub exclude: Vec<EntityId>,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            mask: CollisionMask::ALL,
            exclude: Vec::new(),
        }
    }
}

impl RaycastOptions {
    /// Set maximum distance
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Set the layer mask
    pub fn with_mask(mut self, mask: CollisionMask) -> Self {
        self.mask = mask;
        self
    }

    /// Ignore an entity
    pub fn exclude(mut self, entity: EntityId) -> Self {
        self.exclude.push(entity);
        self
    }
}

/// Ray queries answered by the host
pub trait SpatialQuery {
    /// Nearest blocking surface along the ray, if any within range
    fn raycast(&self, ray: &Ray, options: &RaycastOptions) -> Option<RaycastHit>;
}
