//! Collectible coins

use glam::{Quat, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coin appearance and worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinConfig {
    pub value: u32,
    /// Spin around the vertical axis, degrees per second
    pub rotation_speed: f32,
    pub hover: bool,
    pub hover_amplitude: f32,
    pub hover_speed: f32,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            value: 1,
            rotation_speed: 100.0,
            hover: true,
            hover_amplitude: 0.2,
            hover_speed: 2.0,
        }
    }
}

/// A coin placed in the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub config: CoinConfig,
    /// Resting position the hover oscillates around
    pub base: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Coin {
    pub fn new(config: CoinConfig, position: Vec3) -> Self {
        Self {
            config,
            base: position,
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn value(&self) -> u32 {
        self.config.value
    }

    /// Spin and bob
    pub fn step(&mut self, now: f32, dt: f32) {
        let spin = (self.config.rotation_speed * dt).to_radians();
        self.rotation = (self.rotation * Quat::from_rotation_y(spin)).normalize();
        if self.config.hover {
            self.position.y = self.base.y + (now * self.config.hover_speed).sin() * self.config.hover_amplitude;
        }
    }
}

/// Coin placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinSpawnerConfig {
    pub max_coins: usize,
    /// Probability that a given floor tile gets a coin
    pub spawn_chance: f32,
    /// Height above the tile
    pub spawn_height: f32,
    /// Minimum distance between two coins
    pub min_distance: f32,
    /// Use these positions instead of floor tiles when non-empty
    pub manual_points: Vec<Vec3>,
}

impl Default for CoinSpawnerConfig {
    fn default() -> Self {
        Self {
            max_coins: 20,
            spawn_chance: 0.3,
            spawn_height: 1.0,
            min_distance: 2.0,
            manual_points: Vec::new(),
        }
    }
}

/// Scatters coins over floor tiles
#[derive(Debug, Clone)]
pub struct CoinSpawner {
    pub config: CoinSpawnerConfig,
    coin: Option<CoinConfig>,
}

impl CoinSpawner {
    pub fn new(config: CoinSpawnerConfig) -> Self {
        Self { config, coin: None }
    }

    /// Coin template. A spawner without one places nothing.
    pub fn with_coin(mut self, coin: CoinConfig) -> Self {
        self.coin = Some(coin);
        self
    }

    pub fn coin(&self) -> Option<&CoinConfig> {
        self.coin.as_ref()
    }

    /// Pick coin positions.
    ///
    /// Manual points are taken in order up to `max_coins`. Otherwise the
    /// floor tiles are shuffled and each gets a coin with `spawn_chance`,
    /// unless one is already within `min_distance`.
    pub fn spawn<R: Rng + ?Sized>(&self, floor_tiles: &[Vec3], rng: &mut R) -> Vec<Vec3> {
        if self.coin.is_none() {
            log::error!("coin spawner has no coin template");
            return Vec::new();
        }

        let positions = if self.config.manual_points.is_empty() {
            self.spawn_on_tiles(floor_tiles, rng)
        } else {
            self.config
                .manual_points
                .iter()
                .take(self.config.max_coins)
                .copied()
                .collect()
        };

        log::info!("coin spawner placed {} coins", positions.len());
        positions
    }

    /// Spawn and build the coins in one go
    pub fn spawn_coins<R: Rng + ?Sized>(&self, floor_tiles: &[Vec3], rng: &mut R) -> Vec<Coin> {
        let Some(template) = self.coin else {
            log::error!("coin spawner has no coin template");
            return Vec::new();
        };
        self.spawn(floor_tiles, rng)
            .into_iter()
            .map(|position| Coin::new(template, position))
            .collect()
    }

    fn spawn_on_tiles<R: Rng + ?Sized>(&self, floor_tiles: &[Vec3], rng: &mut R) -> Vec<Vec3> {
        if floor_tiles.is_empty() {
            log::warn!("coin spawner found no floor tiles");
            return Vec::new();
        }

        let mut tiles = floor_tiles.to_vec();
        tiles.shuffle(rng);

        let min_sq = self.config.min_distance * self.config.min_distance;
        let mut placed: Vec<Vec3> = Vec::new();
        for tile in tiles {
            if placed.len() >= self.config.max_coins {
                break;
            }
            if rng.gen::<f32>() > self.config.spawn_chance {
                continue;
            }
            let position = tile + Vec3::Y * self.config.spawn_height;
            if placed.iter().any(|p| p.distance_squared(position) < min_sq) {
                continue;
            }
            placed.push(position);
        }
        placed
    }
}

impl Default for CoinSpawner {
    fn default() -> Self {
        Self::new(CoinSpawnerConfig::default()).with_coin(CoinConfig::default())
    }
}

/// Identifies a collector subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type TotalListener = Box<dyn FnMut(u32) + Send>;

/// Running coin tally. Subscribers receive the new total on every change.
#[derive(Default)]
pub struct CoinCollector {
    total: u32,
    subscribers: Vec<(SubscriberId, TotalListener)>,
    next_id: u64,
}

impl CoinCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriberId
    where
        F: FnMut(u32) + Send + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Pick up a coin. Returns the new total.
    pub fn collect(&mut self, coin: &Coin) -> u32 {
        self.add(coin.value());
        log::debug!("coin collected, total {}", self.total);
        self.total
    }

    pub fn add(&mut self, amount: u32) {
        self.total = self.total.saturating_add(amount);
        self.notify();
    }

    pub fn reset(&mut self) {
        self.total = 0;
        self.notify();
    }

    fn notify(&mut self) {
        let total = self.total;
        for (_, listener) in &mut self.subscribers {
            listener(total);
        }
    }
}

impl std::fmt::Debug for CoinCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinCollector")
            .field("total", &self.total)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
