//! Tank Arena - A tiled-arena arcade tank game
//!
//! Core modules:
//! - `sim`: Entity simulation (collision queries, lifecycle, per-frame scheduling)
//! - `assets`: Model/texture lookup service
//! - `render`: Display-graph abstraction the scene hands its visuals to
//! - `input`: Directional/fire input events
//! - `settings`: Data-driven game tuning

pub mod assets;
pub mod error;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use assets::Assets;
pub use error::{AssetError, ConfigError, LoadError};
pub use settings::Settings;

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Model every tank is built from
    pub const TANK_MODEL: &str = "tank";
    /// Named parts the tank model must contain
    pub const TANK_BODY_PART: &str = "Body";
    pub const TANK_TURRET_PART: &str = "Turret";

    /// Player tank textures
    pub const PLAYER_BODY_TEXTURE: &str = "tank-body";
    pub const PLAYER_TURRET_TEXTURE: &str = "tank-turret";
    /// Enemy tank textures
    pub const ENEMY_BODY_TEXTURE: &str = "tank-body-red";
    pub const ENEMY_TURRET_TEXTURE: &str = "tank-turret-red";
    /// Wall texture
    pub const WALL_TEXTURE: &str = "wall";

    /// Bullet color
    pub const BULLET_COLOR: u32 = 0x262626;

    /// Explosion particle count range (inclusive)
    pub const EXPLOSION_PARTICLES: (i32, i32) = (7, 13);
    /// Muzzle particle count range (inclusive)
    pub const SHOOT_PARTICLES: (i32, i32) = (4, 9);
}

/// Returns -1.0 or 1.0 with equal probability
#[inline]
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random::<f32>() < 0.5 { -1.0 } else { 1.0 }
}

/// Random integer in `[min, max]` (both ends inclusive)
#[inline]
pub fn random_int_in_range<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    (rng.random::<f32>() * (max - min + 1) as f32).floor() as i32 + min
}

/// Unit direction for a rotation around +Z.
///
/// Rotation 0 faces -Y; positive rotation turns counter-clockwise.
#[inline]
pub fn heading(rotation: f32) -> Vec3 {
    Vec3::new(rotation.sin(), -rotation.cos(), 0.0)
}

/// Wrap an angle into `[0, 2π)`
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU { 0.0 } else { wrapped }
}
