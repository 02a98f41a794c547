//! Entity simulation
//!
//! All gameplay logic lives here. The simulation never draws and never reads
//! devices:
//! - One frame = disposal pass, update pass, spawn registration, redraw
//! - Registration order is update order
//! - Randomness comes from the scene's seeded RNG only

pub mod bullet;
pub mod collider;
pub mod effects;
pub mod entity;
pub mod map;
pub mod scene;
pub mod tank;
pub mod world;

pub use bullet::Bullet;
pub use collider::{Aabb, Collider, Sphere};
pub use effects::{EffectTimer, Explosion, Particle, ShootEffect};
pub use entity::{Entity, EntityCore, EntityId, EntityKind, GameEntity, LoadContext};
pub use map::{GameMap, MapTile, Wall, perimeter_positions};
pub use scene::{FrameClock, FrameStats, GameScene};
pub use tank::{EnemyTank, PlayerTank, random_heading};
pub use world::{FrameContext, Hit, Neighbors, Spawner};
