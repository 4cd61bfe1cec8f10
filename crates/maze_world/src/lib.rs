//! Maze World - Level Population
//!
//! # Features
//!
//! - Rejection-sampled forest placement on flat ground or a height field
//! - Instanced transform batches for the renderer, or per-tree entity spawns
//! - Proximity activation that keeps only nearby tree colliders enabled
//! - Coins: spin/hover animation, floor-tile spawner and a collector tally
//!
//! # Example
//!
//! ```ignore
//! use maze_world::prelude::*;
//!
//! let generator = ForestGenerator::new(ForestConfig::default(), SpawnSurface::default());
//! let forest = generator.generate(&mut generator.rng());
//! forest.submit(&mut renderer);
//! ```

pub mod activation;
pub mod coins;
pub mod forest;
pub mod terrain;

pub mod prelude {
    pub use crate::activation::{ActivationConfig, ProximityActivator};
    pub use crate::coins::{
        Coin, CoinCollector, CoinConfig, CoinSpawner, CoinSpawnerConfig, SubscriberId,
    };
    pub use crate::forest::{
        Forest, ForestConfig, ForestGenerator, ForestInstance, ForestLayout, InstancedRenderer,
        TreeSpawn,
    };
    pub use crate::terrain::{HeightField, SpawnSurface};
}

pub use prelude::*;

use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Seeded generator when a seed is given, entropy-seeded otherwise
pub fn make_rng(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    }
}
