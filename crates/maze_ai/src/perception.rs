//! Line-of-sight checks

use glam::Vec3;
use maze_core::EntityId;
use maze_physics::{CollisionMask, Ray, RaycastOptions, SpatialQuery};

/// Outcome of a line-of-sight check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sight {
    /// Nothing between the eye and the target
    Clear,
    /// The ray reached the target first
    Target,
    /// Something else was hit within the target's distance
    Blocked(EntityId),
}

impl Sight {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Sight::Blocked(_))
    }
}

/// Cast from `eye` towards `target_position` and report what is in the way.
///
/// Only surfaces closer than the target count as occluders.
pub fn line_of_sight(
    query: &dyn SpatialQuery,
    eye: Vec3,
    target: EntityId,
    target_position: Vec3,
    mask: CollisionMask,
    exclude: Option<EntityId>,
) -> Sight {
    let offset = target_position - eye;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return Sight::Target;
    }

    let mut options = RaycastOptions::default()
        .with_max_distance(distance)
        .with_mask(mask);
    if let Some(id) = exclude {
        options = options.exclude(id);
    }

    match query.raycast(&Ray::new(eye, offset), &options) {
        Some(hit) if hit.entity == target => Sight::Target,
        Some(hit) => Sight::Blocked(hit.entity),
        None => Sight::Clear,
    }
}
