//! Maze AI - Turret Behaviour
//!
//! # Features
//!
//! - Static target acquisition by capability, done once
//! - Line-of-sight checks against the host's spatial query
//! - Bounded-rate aiming (spherical interpolation)
//! - Fire-interval gating that emits projectile spawn commands
//!
//! # Example
//!
//! ```ignore
//! use maze_ai::prelude::*;
//!
//! let mut turret = Turret::new(TurretConfig::default(), position)
//!     .with_projectile(ProjectileConfig::default());
//! turret.acquire_target(&registry);
//!
//! if let Some(shot) = turret.step(&TurretContext::new(now, dt, &world).with_target_position(player_pos)) {
//!     spawn_projectile(shot);
//! }
//! ```

pub mod perception;
pub mod turret;

pub mod prelude {
    pub use crate::perception::{line_of_sight, Sight};
    pub use crate::turret::{FireCommand, Turret, TurretConfig, TurretContext, TurretState};
}

pub use prelude::*;
