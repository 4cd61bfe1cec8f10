//! Maze Combat - Health, Damage-over-Time and Damage Sources
//!
//! # Features
//!
//! - Health record with synchronous damaged / died notifications
//! - Poison status effect: refreshable, never stacking
//! - Projectiles that home on a live target and may poison on hit
//! - Contact damage for spikes and traps, one-shot or continuous
//! - Damage flash feedback as a small time-keyed state machine
//!
//! # Example
//!
//! ```ignore
//! use maze_combat::prelude::*;
//!
//! let mut player = Combatant::new(100.0);
//! player.health.subscribe(|event| log::info!("player: {:?}", event));
//!
//! player.status.apply_poison(PoisonSpec::new(5.0, 1.0, 5.0), now);
//! let tick = player.step(now);
//! ```

pub mod combatant;
pub mod damage;
pub mod flash;
pub mod health;
pub mod projectile;
pub mod status;

pub mod prelude {
    pub use crate::combatant::Combatant;
    pub use crate::damage::{ContactDamage, ContactDamageConfig, TargetFilter};
    pub use crate::flash::{DamageFlash, FlashConfig};
    pub use crate::health::{Health, HealthEvent, ListenerId};
    pub use crate::projectile::{
        ContactOutcome, Projectile, ProjectileBody, ProjectileConfig, ProjectileStep,
    };
    pub use crate::status::{Poison, PoisonSpec, StatusEffects, StatusTick};
}

pub use prelude::*;
