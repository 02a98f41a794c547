//! Error types
//!
//! Load errors abort a single entity's activation; config and asset errors
//! surface while the game is being set up.

use thiserror::Error;

/// Failure while preparing an entity for the scene.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("unable to get model `{0}`")]
    MissingModel(String),
    #[error("unable to get texture `{0}`")]
    MissingTexture(String),
    /// The model exists but lacks a part the entity needs
    #[error("model `{model}` has no part named `{part}`")]
    MissingModelPart { model: String, part: String },
    #[error("no ground textures loaded")]
    NoGroundTextures,
}

/// Failure while building the asset service.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("asset `{0}` registered twice")]
    Duplicate(String),
}

/// Failure while reading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
