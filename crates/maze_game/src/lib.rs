//! Maze Game - Scene Host
//!
//! Wires the gameplay crates into one frame-stepped scene: the host spawns
//! entities, moves the player and calls [`Scene::step`] once per frame.
//!
//! # Step Order
//!
//! 1. Clock advance (one time sample for the whole step)
//! 2. Turrets perceive, rotate and fire
//! 3. Projectiles home, move and expire; coins spin and hover
//! 4. Collider positions sync, contacts are dispatched
//! 5. Status effects tick, damage flashes advance
//! 6. Tree colliders near the player are activated
//! 7. Deferred destruction, then death handling
//!
//! # Example
//!
//! ```ignore
//! use maze_game::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::load("scene.toml")?);
//! let player = scene.spawn_player(Vec3::ZERO);
//! scene.spawn_turret(Vec3::new(10.0, 0.0, 0.0));
//!
//! loop {
//!     let report = scene.step(1.0 / 60.0);
//!     if report.game_over {
//!         break;
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod scene;

pub mod prelude {
    pub use crate::config::{
        PlayerConfig, SceneConfig, SessionConfig, SimulationConfig, TreeConfig,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::scene::{Scene, Session, StepReport};
}

pub use prelude::*;
