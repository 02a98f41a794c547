//! Asset lookup service
//!
//! Models and textures are registered up front, before any entity loads.
//! Entities only ask for them by name; decoding the underlying files is the
//! platform's job, so a texture here is just a stable handle.

use std::collections::HashMap;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{AssetError, LoadError};
use crate::sim::collider::Aabb;

/// Opaque texture handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    pub id: u32,
    pub name: String,
}

/// A named piece of a model with its local bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPart {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelPart {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }
}

/// A model made of named parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub parts: Vec<ModelPart>,
}

impl Model {
    pub fn part(&self, name: &str) -> Option<&ModelPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Look up a part, reporting malformed model data as a load error
    pub fn require_part(&self, name: &str) -> Result<&ModelPart, LoadError> {
        self.part(name).ok_or_else(|| LoadError::MissingModelPart {
            model: self.name.clone(),
            part: name.to_string(),
        })
    }

    /// Local bounds enclosing every part
    pub fn bounds(&self) -> Option<Aabb> {
        self.parts
            .iter()
            .map(ModelPart::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Asset list as written in a manifest file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub models: Vec<Model>,
    pub textures: Vec<String>,
    pub ground_textures: Vec<String>,
}

/// All loaded models and textures
#[derive(Debug, Clone, Default)]
pub struct Assets {
    models: HashMap<String, Model>,
    textures: HashMap<String, Texture>,
    ground_textures: Vec<Texture>,
    next_texture_id: u32,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock asset set the game ships with
    pub fn builtin() -> Self {
        let mut assets = Self::new();

        assets.insert_model(Model {
            name: TANK_MODEL.to_string(),
            parts: vec![
                ModelPart {
                    name: TANK_BODY_PART.to_string(),
                    min: Vec3::new(-0.35, -0.45, 0.0),
                    max: Vec3::new(0.35, 0.45, 0.3),
                },
                ModelPart {
                    name: TANK_TURRET_PART.to_string(),
                    min: Vec3::new(-0.2, -0.6, 0.3),
                    max: Vec3::new(0.2, 0.25, 0.5),
                },
            ],
        });

        for name in [
            PLAYER_BODY_TEXTURE,
            PLAYER_TURRET_TEXTURE,
            ENEMY_BODY_TEXTURE,
            ENEMY_TURRET_TEXTURE,
            WALL_TEXTURE,
        ] {
            assets.insert_texture(name);
        }

        for name in ["g1", "g2", "g3", "g4", "g5", "g7", "g8"] {
            assets.insert_ground_texture(name);
        }

        assets
    }

    /// Build the asset service from a JSON manifest
    pub fn from_manifest(json: &str) -> Result<Self, AssetError> {
        let manifest: AssetManifest = serde_json::from_str(json)?;
        let mut assets = Self::new();
        for model in manifest.models {
            assets.add_model(model)?;
        }
        for name in &manifest.textures {
            assets.add_texture(name)?;
        }
        for name in &manifest.ground_textures {
            assets.add_ground_texture(name)?;
        }
        log::info!(
            "Assets ready: {} models, {} textures, {} ground textures",
            assets.models.len(),
            assets.textures.len(),
            assets.ground_textures.len()
        );
        Ok(assets)
    }

    pub fn add_model(&mut self, model: Model) -> Result<(), AssetError> {
        if self.models.contains_key(&model.name) {
            return Err(AssetError::Duplicate(model.name));
        }
        self.insert_model(model);
        Ok(())
    }

    pub fn add_texture(&mut self, name: &str) -> Result<Texture, AssetError> {
        if self.textures.contains_key(name) {
            return Err(AssetError::Duplicate(name.to_string()));
        }
        Ok(self.insert_texture(name))
    }

    /// Register a texture the map may pick for a tile
    pub fn add_ground_texture(&mut self, name: &str) -> Result<Texture, AssetError> {
        if self.ground_textures.iter().any(|t| t.name == name) {
            return Err(AssetError::Duplicate(name.to_string()));
        }
        Ok(self.insert_ground_texture(name))
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    pub fn require_model(&self, name: &str) -> Result<&Model, LoadError> {
        self.model(name)
            .ok_or_else(|| LoadError::MissingModel(name.to_string()))
    }

    pub fn require_texture(&self, name: &str) -> Result<&Texture, LoadError> {
        self.texture(name)
            .ok_or_else(|| LoadError::MissingTexture(name.to_string()))
    }

    /// Pick one of the ground textures uniformly
    pub fn random_ground_texture<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Texture, LoadError> {
        if self.ground_textures.is_empty() {
            return Err(LoadError::NoGroundTextures);
        }
        let index = rng.random_range(0..self.ground_textures.len());
        Ok(&self.ground_textures[index])
    }

    pub fn ground_textures(&self) -> &[Texture] {
        &self.ground_textures
    }

    fn insert_model(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    fn insert_texture(&mut self, name: &str) -> Texture {
        let texture = self.next_texture(name);
        self.textures.insert(name.to_string(), texture.clone());
        texture
    }

    fn insert_ground_texture(&mut self, name: &str) -> Texture {
        let texture = self.next_texture(name);
        self.ground_textures.push(texture.clone());
        texture
    }

    fn next_texture(&mut self, name: &str) -> Texture {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        Texture {
            id,
            name: name.to_string(),
        }
    }
}
