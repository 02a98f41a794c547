//! Display-graph abstraction
//!
//! The simulation never draws. It tells a [`DisplayGraph`] which visuals
//! exist, and once per frame hands over where they are and where the camera
//! looks. A GPU backend implements the trait; [`HeadlessDisplay`] is the
//! in-process implementation used by the native driver and tests.

use std::collections::HashMap;

use glam::Vec3;

use crate::assets::Texture;
use crate::sim::entity::EntityId;

/// One background tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileVisual {
    pub position: Vec3,
    pub texture: Texture,
}

/// What an entity looks like, built during load
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Visual {
    /// Not loaded yet, or already released
    #[default]
    Empty,
    /// Textured tank model (body + turret)
    Tank { body: Texture, turret: Texture },
    /// Textured unit cube
    Block { size: f32, texture: Texture },
    /// Flat-colored sphere
    Ball { radius: f32, color: u32 },
    /// Ground plane made of textured tiles
    Tiles(Vec<TileVisual>),
    /// Particle cloud
    Particles { fire: usize, smoke: usize },
}

/// Camera state the display redraws against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    /// Recenter over a point, keeping the camera height
    pub fn follow(&mut self, target: Vec3) {
        self.position.x = target.x;
        self.position.y = target.y;
    }
}

/// Which half of a particle effect a particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Fire,
    Smoke,
}

/// Current state of one animated particle, relative to its entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    pub kind: ParticleKind,
    pub offset: Vec3,
    /// Drawn size (base size times current scale)
    pub size: f32,
    pub opacity: f32,
}

/// Per-entity state handed to the display each frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub id: EntityId,
    pub position: Vec3,
    /// Rotation around +Z in radians
    pub rotation: f32,
    /// Animated particles; empty for everything but effects
    pub particles: Vec<ParticleInstance>,
}

/// Rendering collaborator
pub trait DisplayGraph {
    /// Add an entity's visual to the displayed scene
    fn attach(&mut self, id: EntityId, visual: &Visual);
    /// Remove an entity's visual from the displayed scene
    fn detach(&mut self, id: EntityId);
    /// Draw the current frame
    fn redraw(&mut self, camera: &Camera, items: &[RenderItem]);
}

/// Display that keeps the scene graph in memory without drawing
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    attached: HashMap<EntityId, Visual>,
    detached: Vec<EntityId>,
    frames: u64,
    last_camera: Option<Camera>,
    last_items: Vec<RenderItem>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn is_attached(&self, id: EntityId) -> bool {
        self.attached.contains_key(&id)
    }

    pub fn visual(&self, id: EntityId) -> Option<&Visual> {
        self.attached.get(&id)
    }

    /// Every detach received, in order
    pub fn detached(&self) -> &[EntityId] {
        &self.detached
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_camera(&self) -> Option<Camera> {
        self.last_camera
    }

    pub fn last_items(&self) -> &[RenderItem] {
        &self.last_items
    }

    /// Item drawn for `id` in the last frame
    pub fn last_item(&self, id: EntityId) -> Option<&RenderItem> {
        self.last_items.iter().find(|item| item.id == id)
    }
}

impl DisplayGraph for HeadlessDisplay {
    fn attach(&mut self, id: EntityId, visual: &Visual) {
        if self.attached.insert(id, visual.clone()).is_some() {
            log::warn!("Entity {id} attached twice");
        }
    }

    fn detach(&mut self, id: EntityId) {
        if self.attached.remove(&id).is_none() {
            log::warn!("Entity {id} detached but was never attached");
        }
        self.detached.push(id);
    }

    fn redraw(&mut self, camera: &Camera, items: &[RenderItem]) {
        self.frames += 1;
        self.last_camera = Some(*camera);
        self.last_items.clear();
        self.last_items.extend_from_slice(items);
        log::trace!("Frame {}: {} items", self.frames, items.len());
    }
}
