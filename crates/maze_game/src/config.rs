//! Scene configuration
//!
//! Every section is optional; missing sections and keys take the defaults
//! of the components they configure.
//!
//! # Example Config File
//!
//! ```toml
//! seed = 7
//!
//! [player]
//! max_health = 100.0
//!
//! [turret]
//! detection_range = 15.0
//! fire_interval = 2.0
//!
//! [projectile]
//! damage = 15.0
//! body = "trigger"
//!
//! [forest]
//! tree_count = 200
//! instanced = false
//!
//! [simulation]
//! duration = 30.0
//! ```

use crate::error::{GameError, Result};
use maze_ai::TurretConfig;
use maze_combat::{ContactDamageConfig, FlashConfig, ProjectileConfig};
use maze_world::{ActivationConfig, CoinConfig, CoinSpawnerConfig, ForestConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on `forest.tree_count`
pub const MAX_TREE_COUNT: usize = 100_000;

/// Player settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    /// Collider radius
    pub radius: f32,
    /// Hit flash; `None` disables it
    pub flash: Option<FlashConfig>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            radius: 0.5,
            flash: Some(FlashConfig::default()),
        }
    }
}

/// How generated trees become entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Number of tree prefabs available in entity mode
    pub prefabs: usize,
    /// Give instanced trees collider-only entities as well
    pub instanced_colliders: bool,
    /// Trunk collider radius at scale 1
    pub trunk_radius: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            prefabs: 1,
            instanced_colliders: true,
            trunk_radius: 0.4,
        }
    }
}

/// Game-over behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Freeze time when the player dies
    pub pause_on_death: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { pause_on_death: true }
    }
}

/// Headless run settings for `maze-sim`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds of game time to simulate
    pub duration: f32,
    /// Steps per second
    pub tick_rate: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            tick_rate: 60,
        }
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for coin placement and unseeded forests
    pub seed: Option<u64>,
    pub player: PlayerConfig,
    pub turret: TurretConfig,
    /// Projectile template given to every turret
    pub projectile: ProjectileConfig,
    /// Contact damage of hazards
    pub hazard: ContactDamageConfig,
    pub forest: ForestConfig,
    pub trees: TreeConfig,
    pub activation: ActivationConfig,
    pub coins: CoinSpawnerConfig,
    pub coin: CoinConfig,
    pub session: SessionConfig,
    pub simulation: SimulationConfig,
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Reject values the components cannot run with
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f32) -> Result<()> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(GameError::InvalidConfig(format!("{} must be positive, got {}", name, value)))
            }
        }

        positive("player.max_health", self.player.max_health)?;
        positive("turret.fire_interval", self.turret.fire_interval)?;
        positive("activation.poll_interval", self.activation.poll_interval)?;
        if let Some(poison) = &self.projectile.poison {
            positive("projectile.poison.tick_interval", poison.tick_interval)?;
        }
        if self.hazard.continuous {
            positive("hazard.damage_interval", self.hazard.damage_interval)?;
        }
        if let Some(flash) = &self.player.flash {
            positive("player.flash.flash_duration", flash.flash_duration)?;
        }

        fn finite(name: &str, value: f32) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(GameError::InvalidConfig(format!("{} must be finite and non-negative, got {}", name, value)))
            }
        }

        finite("forest.spawn_area.x", self.forest.spawn_area.x)?;
        finite("forest.spawn_area.y", self.forest.spawn_area.y)?;
        finite("forest.min_spacing", self.forest.min_spacing)?;
        finite("forest.min_scale", self.forest.min_scale)?;
        finite("forest.max_scale", self.forest.max_scale)?;
        if self.forest.tree_count > MAX_TREE_COUNT {
            return Err(GameError::InvalidConfig(format!(
                "forest.tree_count must be at most {}, got {}",
                MAX_TREE_COUNT, self.forest.tree_count
            )));
        }
        if self.forest.min_scale > self.forest.max_scale {
            return Err(GameError::InvalidConfig(format!(
                "forest.min_scale ({}) exceeds forest.max_scale ({})",
                self.forest.min_scale, self.forest.max_scale
            )));
        }
        if self.forest.batch_size == 0 {
            return Err(GameError::InvalidConfig("forest.batch_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.coins.spawn_chance) {
            return Err(GameError::InvalidConfig(format!(
                "coins.spawn_chance must be within [0, 1], got {}",
                self.coins.spawn_chance
            )));
        }
        if self.simulation.tick_rate == 0 {
            return Err(GameError::InvalidConfig("simulation.tick_rate must be at least 1".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_combat::ProjectileBody;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = SceneConfig::from_toml_str(
            r#"
            seed = 7

            [turret]
            detection_range = 20.0

            [projectile]
            damage = 40.0
            body = "physical"

            [forest]
            tree_count = 12
            spawn_area = [30.0, 30.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.turret.detection_range, 20.0);
        assert_eq!(config.turret.fire_interval, 2.0);
        assert_eq!(config.projectile.damage, 40.0);
        assert_eq!(config.projectile.body, ProjectileBody::Physical);
        assert_eq!(config.projectile.speed, 20.0);
        assert_eq!(config.forest.tree_count, 12);
        assert_eq!(config.forest.batch_size, 1023);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            "[player]\nmax_health = 0.0",
            "[turret]\nfire_interval = -1.0",
            "[forest]\nmin_scale = 2.0\nmax_scale = 1.0",
            "[forest]\nbatch_size = 0",
            "[coins]\nspawn_chance = 1.5",
            "[activation]\npoll_interval = 0.0",
            "[forest]\nspawn_area = [inf, inf]",
            "[forest]\nspawn_area = [-10.0, 10.0]",
            "[forest]\nmin_spacing = nan",
            "[forest]\nmax_scale = inf",
            "[forest]\ntree_count = 9223372036854775807",
        ];
        for case in cases {
            let err = SceneConfig::from_toml_str(case).unwrap_err();
            assert!(matches!(err, GameError::InvalidConfig(_)), "{case}: {err}");
        }
    }

    #[test]
    fn test_parse_error() {
        let err = SceneConfig::from_toml_str("[player\nmax_health = 1").unwrap_err();
        assert!(matches!(err, GameError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load("/nonexistent/maze/scene.toml").unwrap_err();
        assert!(matches!(err, GameError::Io(_)));
    }
}
