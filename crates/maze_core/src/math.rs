//! Orientation helpers on top of glam
//!
//! Forward is +Z, up is +Y.

use glam::{Quat, Vec3};

/// Orientation whose forward axis points along `direction`.
///
/// Returns `None` for a zero-length direction.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let dir = direction.try_normalize()?;
    let yaw = dir.x.atan2(dir.z);
    let pitch = -dir.y.clamp(-1.0, 1.0).asin();
    Some(Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch))
}

/// Rotation about the vertical axis, in degrees
pub fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}
