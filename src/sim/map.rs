//! Static arena geometry
//!
//! The ground is one entity holding a grid of tiles that never collide.
//! Walls are individual unit-box colliders ringing the grid.

use glam::Vec3;

use super::collider::{Aabb, Collider};
use super::entity::{EntityCore, EntityKind, GameEntity, LoadContext};
use crate::assets::Texture;
use crate::consts::WALL_TEXTURE;
use crate::error::LoadError;
use crate::render::{TileVisual, Visual};

/// One ground tile
#[derive(Debug, Clone, PartialEq)]
pub struct MapTile {
    pub position: Vec3,
    pub texture: Option<Texture>,
}

/// Square grid of ground tiles with its corner at the map origin
#[derive(Debug, Clone)]
pub struct GameMap {
    core: EntityCore,
    size: u32,
    tiles: Vec<MapTile>,
}

impl GameMap {
    pub fn new(position: Vec3, size: u32) -> Self {
        let tiles = (0..size)
            .flat_map(|i| (0..size).map(move |j| (i, j)))
            .map(|(i, j)| MapTile {
                position: position + Vec3::new(i as f32, j as f32, 0.0),
                texture: None,
            })
            .collect();
        Self {
            core: EntityCore::new(position, EntityKind::General),
            size,
            tiles,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn tiles(&self) -> &[MapTile] {
        &self.tiles
    }
}

impl GameEntity for GameMap {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        for tile in &mut self.tiles {
            tile.texture = Some(ctx.assets.random_ground_texture(ctx.rng)?.clone());
        }
        self.core.visual = Visual::Tiles(
            self.tiles
                .iter()
                .filter_map(|tile| {
                    tile.texture.clone().map(|texture| TileVisual {
                        position: tile.position,
                        texture,
                    })
                })
                .collect(),
        );
        Ok(())
    }

    fn release(&mut self) {
        for tile in &mut self.tiles {
            tile.texture = None;
        }
    }
}

/// Immovable unit-cube obstacle
#[derive(Debug, Clone)]
pub struct Wall {
    core: EntityCore,
}

impl Wall {
    pub fn new(position: Vec3) -> Self {
        Self {
            core: EntityCore::new(position, EntityKind::General),
        }
    }
}

impl GameEntity for Wall {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        let texture = ctx.assets.require_texture(WALL_TEXTURE)?;
        self.core.visual = Visual::Block {
            size: 1.0,
            texture: texture.clone(),
        };
        self.core.collider = Some(Collider::Aabb(Aabb::cube(self.core.position, 1.0)));
        Ok(())
    }
}

/// Wall positions around the edge of a `size` x `size` map: the four corners
/// first, then each edge filled in. Maps smaller than 2 have no ring.
pub fn perimeter_positions(size: u32) -> Vec<Vec3> {
    if size < 2 {
        return Vec::new();
    }
    let edge = (size - 1) as f32;
    let mut positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(edge, 0.0, 0.0),
        Vec3::new(edge, edge, 0.0),
        Vec3::new(0.0, edge, 0.0),
    ];
    for i in 1..size - 1 {
        let i = i as f32;
        positions.push(Vec3::new(i, 0.0, 0.0));
        positions.push(Vec3::new(0.0, i, 0.0));
        positions.push(Vec3::new(edge, i, 0.0));
        positions.push(Vec3::new(i, edge, 0.0));
    }
    positions
}
