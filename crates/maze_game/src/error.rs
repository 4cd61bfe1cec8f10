//! Error types for scene setup

use thiserror::Error;

/// Errors raised while loading or validating a scene configuration.
///
/// Gameplay itself never fails: missing components make the affected
/// behaviour inert instead.
#[derive(Debug, Error)]
pub enum GameError {
    /// The config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for a scene
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range
    #[error("Invalid scene configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for scene setup
pub type Result<T> = std::result::Result<T, GameError>;
