//! Reference collider world
//!
//! Axis-aligned spheres and boxes keyed by entity. Good enough to answer
//! line-of-sight rays and overlap tests for the headless simulation.

use crate::layers::{CollisionLayer, CollisionMask};
use crate::query::{Ray, RaycastHit, RaycastOptions, SpatialQuery};
use glam::Vec3;
use maze_core::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Sphere with radius
    Sphere { radius: f32 },
    /// Axis-aligned box with half-extents
    Cuboid { half_extents: Vec3 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Sphere { radius: 0.5 }
    }
}

/// Description of a collider to insert
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    pub position: Vec3,
    /// Layer this collider lives on
    pub layer: CollisionLayer,
    /// Layers this collider produces contacts with
    pub collides_with: CollisionMask,
    /// Sensors produce trigger contacts and are ignored by raycasts
    pub sensor: bool,
    /// Moving colliders are tested against everything else each update
    pub dynamic: bool,
    pub enabled: bool,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            position: Vec3::ZERO,
            layer: CollisionLayer::DEFAULT,
            collides_with: CollisionMask::ALL,
            sensor: false,
            dynamic: false,
            enabled: true,
        }
    }
}

impl ColliderDesc {
    /// Sphere collider
    pub fn ball(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            ..Default::default()
        }
    }

    /// Box collider
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            ..Default::default()
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_collides_with(mut self, mask: CollisionMask) -> Self {
        self.collides_with = mask;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A collider owned by an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub desc: ColliderDesc,
}

impl Collider {
    pub fn position(&self) -> Vec3 {
        self.desc.position
    }

    pub fn is_enabled(&self) -> bool {
        self.desc.enabled
    }

    /// Whether contacts between the two colliders are allowed by their layers
    pub fn interacts_with(&self, other: &Collider) -> bool {
        self.desc.collides_with.contains(other.desc.layer)
            && other.desc.collides_with.contains(self.desc.layer)
    }

    /// Overlap test between two colliders
    pub fn overlaps(&self, other: &Collider) -> bool {
        let (pa, pb) = (self.desc.position, other.desc.position);
        match (self.desc.shape, other.desc.shape) {
            (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
                pa.distance_squared(pb) <= (ra + rb) * (ra + rb)
            }
            (ColliderShape::Sphere { radius }, ColliderShape::Cuboid { half_extents }) => {
                sphere_box_overlap(pa, radius, pb, half_extents)
            }
            (ColliderShape::Cuboid { half_extents }, ColliderShape::Sphere { radius }) => {
                sphere_box_overlap(pb, radius, pa, half_extents)
            }
            (ColliderShape::Cuboid { half_extents: ha }, ColliderShape::Cuboid { half_extents: hb }) => {
                let d = (pa - pb).abs();
                let reach = ha + hb;
                d.x <= reach.x && d.y <= reach.y && d.z <= reach.z
            }
        }
    }

    /// Distance along the ray to this collider, if it is hit
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        match self.desc.shape {
            ColliderShape::Sphere { radius } => ray_sphere(ray, self.desc.position, radius),
            ColliderShape::Cuboid { half_extents } => ray_aabb(
                ray,
                self.desc.position - half_extents,
                self.desc.position + half_extents,
            ),
        }
    }
}

fn sphere_box_overlap(center: Vec3, radius: f32, box_center: Vec3, half_extents: Vec3) -> bool {
    let closest = center.clamp(box_center - half_extents, box_center + half_extents);
    closest.distance_squared(center) <= radius * radius
}

/// Ray-sphere intersection. A ray starting inside reports distance 0.
fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let m = ray.origin - center;
    let b = m.dot(ray.direction);
    let c = m.length_squared() - radius * radius;

    // Origin outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    Some((-b - discriminant.sqrt()).max(0.0))
}

/// Ray-AABB intersection using the slab method
fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.direction.recip();

    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(tmin.max(0.0))
    }
}

/// Enabling and disabling an entity's collider
pub trait ColliderToggle {
    /// Returns false if the entity has no collider
    fn set_enabled(&mut self, entity: EntityId, enabled: bool) -> bool;

    /// `None` if the entity has no collider
    fn is_enabled(&self, entity: EntityId) -> Option<bool>;
}

/// All colliders in the scene
#[derive(Debug, Default)]
pub struct ColliderWorld {
    colliders: BTreeMap<EntityId, Collider>,
}

impl ColliderWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) an entity's collider
    pub fn insert(&mut self, entity: EntityId, desc: ColliderDesc) {
        if self.colliders.insert(entity, Collider { desc }).is_some() {
            log::debug!("replaced collider of {}", entity);
        }
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<Collider> {
        self.colliders.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&Collider> {
        self.colliders.get(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.colliders.contains_key(&entity)
    }

    /// Move a collider. Returns false if the entity has none.
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) -> bool {
        match self.colliders.get_mut(&entity) {
            Some(collider) => {
                collider.desc.position = position;
                true
            }
            None => false,
        }
    }

    /// Iterate colliders in entity order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Collider)> {
        self.colliders.iter().map(|(id, c)| (*id, c))
    }

    /// Number of enabled colliders
    pub fn enabled_count(&self) -> usize {
        self.colliders.values().filter(|c| c.is_enabled()).count()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl SpatialQuery for ColliderWorld {
    fn raycast(&self, ray: &Ray, options: &RaycastOptions) -> Option<RaycastHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }

        self.colliders
            .iter()
            .filter(|(id, c)| {
                c.is_enabled()
                    && !c.desc.sensor
                    && options.mask.contains(c.desc.layer)
                    && !options.exclude.contains(*id)
            })
            .filter_map(|(id, c)| {
                c.ray_distance(ray)
                    .filter(|t| *t <= options.max_distance)
                    .map(|t| (*id, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, distance)| RaycastHit {
                entity,
                point: ray.at(distance),
                distance,
            })
    }
}

impl ColliderToggle for ColliderWorld {
    fn set_enabled(&mut self, entity: EntityId, enabled: bool) -> bool {
        match self.colliders.get_mut(&entity) {
            Some(collider) => {
                collider.desc.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn is_enabled(&self, entity: EntityId) -> Option<bool> {
        self.colliders.get(&entity).map(Collider::is_enabled)
    }
}
