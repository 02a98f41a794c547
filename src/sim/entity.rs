//! Entity identity, shared state, and lifecycle dispatch
//!
//! Every simulated object goes through the same lifecycle: construct, load
//! (may fail), update once per frame until flagged, dispose exactly once.
//! [`Entity`] is the closed set of kinds the scene knows how to run.

use std::fmt;

use glam::Vec3;
use rand_pcg::Pcg32;

use super::bullet::Bullet;
use super::collider::Collider;
use super::effects::{Explosion, ShootEffect};
use super::map::{GameMap, Wall};
use super::tank::{EnemyTank, PlayerTank};
use super::world::FrameContext;
use crate::assets::Assets;
use crate::error::LoadError;
use crate::input::InputEvent;
use crate::render::{RenderItem, Visual};
use crate::settings::Settings;

/// Stable identifier assigned when an entity joins the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type tag used by collision filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    #[default]
    General,
    Player,
    Bullet,
    Enemy,
}

/// State every entity carries
#[derive(Debug, Clone)]
pub struct EntityCore {
    pub position: Vec3,
    /// Rotation around +Z (radians)
    pub rotation: f32,
    pub visual: Visual,
    pub collider: Option<Collider>,
    kind: EntityKind,
    should_dispose: bool,
    disposed: bool,
}

impl EntityCore {
    pub fn new(position: Vec3, kind: EntityKind) -> Self {
        Self {
            position,
            rotation: 0.0,
            visual: Visual::Empty,
            collider: None,
            kind,
            should_dispose: false,
            disposed: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether the scene should remove this entity at its next disposal pass
    pub fn should_dispose(&self) -> bool {
        self.should_dispose
    }

    pub fn mark_for_disposal(&mut self) {
        self.should_dispose = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Move position and collider together
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        if let Some(collider) = &mut self.collider {
            *collider = collider.translated(offset);
        }
    }

    /// Drop the visual and collider. Returns false if already released.
    fn release(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.visual = Visual::Empty;
        self.collider = None;
        self.disposed = true;
        true
    }
}

/// Services available while an entity loads
pub struct LoadContext<'a> {
    pub assets: &'a Assets,
    pub settings: &'a Settings,
    pub rng: &'a mut Pcg32,
}

/// Lifecycle every entity kind implements
pub trait GameEntity {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Build the visual and collider
    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError>;

    /// Advance by `dt` seconds
    fn update(&mut self, _dt: f32, _ctx: &mut FrameContext<'_>) {}

    /// Free anything owned beyond the core visual and collider
    fn release(&mut self) {}
}

/// Every entity kind the scene runs
#[derive(Debug, Clone)]
pub enum Entity {
    Map(GameMap),
    Wall(Wall),
    Player(PlayerTank),
    Enemy(EnemyTank),
    Bullet(Bullet),
    Explosion(Explosion),
    Shoot(ShootEffect),
}

macro_rules! each_variant {
    ($entity:expr, $inner:ident => $body:expr) => {
        match $entity {
            Entity::Map($inner) => $body,
            Entity::Wall($inner) => $body,
            Entity::Player($inner) => $body,
            Entity::Enemy($inner) => $body,
            Entity::Bullet($inner) => $body,
            Entity::Explosion($inner) => $body,
            Entity::Shoot($inner) => $body,
        }
    };
}

impl Entity {
    pub fn core(&self) -> &EntityCore {
        each_variant!(self, e => e.core())
    }

    pub fn core_mut(&mut self) -> &mut EntityCore {
        each_variant!(self, e => e.core_mut())
    }

    pub fn kind(&self) -> EntityKind {
        self.core().kind()
    }

    pub fn position(&self) -> Vec3 {
        self.core().position
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.core().collider.as_ref()
    }

    pub fn should_dispose(&self) -> bool {
        self.core().should_dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.core().is_disposed()
    }

    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Map(_) => "map",
            Entity::Wall(_) => "wall",
            Entity::Player(_) => "player",
            Entity::Enemy(_) => "enemy",
            Entity::Bullet(_) => "bullet",
            Entity::Explosion(_) => "explosion",
            Entity::Shoot(_) => "shoot",
        }
    }

    pub fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        each_variant!(self, e => e.load(ctx))
    }

    pub fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        each_variant!(self, e => e.update(dt, ctx))
    }

    /// Release owned resources. Only the first call does anything; returns
    /// whether this call released them.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        each_variant!(self, e => e.release());
        self.core_mut().release()
    }

    /// Route an input event; only the player listens
    pub fn handle_input(&mut self, event: InputEvent) {
        if let Entity::Player(player) = self {
            player.handle_input(event);
        }
    }

    pub fn render_item(&self, id: EntityId) -> RenderItem {
        let core = self.core();
        let particles = match self {
            Entity::Explosion(explosion) => explosion.particle_instances(),
            Entity::Shoot(shoot) => shoot.particle_instances(),
            _ => Vec::new(),
        };
        RenderItem {
            id,
            position: core.position,
            rotation: core.rotation,
            particles,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyTank> {
        match self {
            Entity::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerTank> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Entity {
            fn from(value: $ty) -> Self {
                Entity::$variant(value)
            }
        })*
    };
}

impl_from_variant!(
    Map(GameMap),
    Wall(Wall),
    Player(PlayerTank),
    Enemy(EnemyTank),
    Bullet(Bullet),
    Explosion(Explosion),
    Shoot(ShootEffect),
);
