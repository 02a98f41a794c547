//! Game tuning
//!
//! Every gameplay constant lives here so balance changes are data-only.
//! Settings load from a JSON file; missing fields keep their defaults.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for every random draw in the scene
    pub seed: u64,

    // === Arena ===
    /// Side length of the square map in tiles (walls sit on the outer ring)
    pub map_size: u32,
    pub player_start: Vec3,
    pub enemy_start: Vec3,
    pub camera_start: Vec3,

    // === Tanks ===
    /// Player speed in tiles per second
    pub player_move_speed: f32,
    /// Player turn rate in radians per second
    pub player_turn_rate: f32,
    /// Enemy speed in tiles per second
    pub enemy_move_speed: f32,
    pub enemy_health: i32,
    /// Tank collider radius relative to the model's bounding sphere
    pub tank_collider_scale: f32,
    /// Bullet spawn offset ahead of the tank
    pub muzzle_forward: f32,
    /// Bullet spawn height above the tank
    pub muzzle_height: f32,

    // === Bullets ===
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_damage: i32,
    /// Seconds before an unexploded bullet is discarded
    pub bullet_lifetime: f32,

    // === Effects ===
    pub explosion_duration: f32,
    /// Explosion size for bullet impacts
    pub impact_explosion_size: f32,
    /// Explosion size for a destroyed tank
    pub tank_explosion_size: f32,
    pub shoot_duration: f32,
    pub shoot_particle_size: f32,

    // === Loop ===
    /// Largest frame delta handed to the simulation (seconds)
    pub max_frame_delta: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x7a4b_2024,

            map_size: 15,
            player_start: Vec3::new(7.0, 7.0, 0.0),
            enemy_start: Vec3::new(3.0, 3.0, 0.0),
            camera_start: Vec3::new(7.0, 7.0, 15.0),

            player_move_speed: 2.0,
            player_turn_rate: std::f32::consts::PI,
            enemy_move_speed: 1.0,
            enemy_health: 100,
            tank_collider_scale: 0.75,
            muzzle_forward: 0.45,
            muzzle_height: 0.5,

            bullet_speed: 9.0,
            bullet_radius: 0.085,
            bullet_damage: 20,
            bullet_lifetime: 4.0,

            explosion_duration: 0.5,
            impact_explosion_size: 1.0,
            tank_explosion_size: 2.0,
            shoot_duration: 1.0,
            shoot_particle_size: 0.1,

            max_frame_delta: 0.1,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size < 2 {
            return Err(invalid("map_size", format!("must be at least 2, got {}", self.map_size)));
        }

        let positive = [
            ("player_move_speed", self.player_move_speed),
            ("enemy_move_speed", self.enemy_move_speed),
            ("tank_collider_scale", self.tank_collider_scale),
            ("bullet_speed", self.bullet_speed),
            ("bullet_radius", self.bullet_radius),
            ("bullet_lifetime", self.bullet_lifetime),
            ("explosion_duration", self.explosion_duration),
            ("impact_explosion_size", self.impact_explosion_size),
            ("tank_explosion_size", self.tank_explosion_size),
            ("shoot_duration", self.shoot_duration),
            ("shoot_particle_size", self.shoot_particle_size),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }

        if self.enemy_health <= 0 {
            return Err(invalid("enemy_health", "must be positive".into()));
        }
        if self.bullet_damage < 0 {
            return Err(invalid("bullet_damage", "must not be negative".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
