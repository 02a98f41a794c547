//! What an entity sees of the world during its update
//!
//! While one entity updates, the scene lends it every *other* registered
//! entity (split around its own slot, so self-exclusion is structural), a
//! spawn queue, the RNG, the camera and the settings. Queries read live
//! state: entities earlier in registry order have already moved this frame.

use rand_pcg::Pcg32;

use super::collider::Collider;
use super::entity::{Entity, EntityId, EntityKind};
use crate::render::Camera;
use crate::settings::Settings;

/// A registered entity and its id
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: EntityId,
    pub entity: Entity,
}

/// One collision query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: EntityId,
    pub kind: EntityKind,
}

/// Entities whose collider intersects `candidate`, in registry order.
///
/// `include` filters by kind; entities without a collider never match.
pub fn collect_hits<'s>(
    slots: impl Iterator<Item = &'s Slot>,
    candidate: &Collider,
    include: impl Fn(EntityKind) -> bool,
) -> Vec<Hit> {
    slots
        .filter(|slot| include(slot.entity.kind()))
        .filter(|slot| {
            slot.entity
                .collider()
                .is_some_and(|collider| collider.intersects(candidate))
        })
        .map(|slot| Hit {
            id: slot.id,
            kind: slot.entity.kind(),
        })
        .collect()
}

/// Every registered entity except the one updating
pub struct Neighbors<'a> {
    before: &'a mut [Slot],
    after: &'a mut [Slot],
}

impl<'a> Neighbors<'a> {
    pub fn new(before: &'a mut [Slot], after: &'a mut [Slot]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.entity)
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entities created mid-frame, waiting to be loaded and registered
#[derive(Debug, Default)]
pub struct Spawner {
    pending: Vec<Entity>,
}

impl Spawner {
    pub fn spawn(&mut self, entity: impl Into<Entity>) {
        let entity = entity.into();
        log::debug!("Queued {} spawn", entity.label());
        self.pending.push(entity);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Entity> {
        self.pending.drain(..)
    }

    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Services lent to an entity for one update call
pub struct FrameContext<'a> {
    pub neighbors: Neighbors<'a>,
    pub spawner: &'a mut Spawner,
    pub rng: &'a mut Pcg32,
    pub camera: &'a mut Camera,
    pub settings: &'a Settings,
}

impl FrameContext<'_> {
    /// Entities (other than the caller) whose collider intersects `candidate`
    pub fn colliding(&self, candidate: &Collider, include: impl Fn(EntityKind) -> bool) -> Vec<Hit> {
        collect_hits(self.neighbors.iter(), candidate, include)
    }

    pub fn spawn(&mut self, entity: impl Into<Entity>) {
        self.spawner.spawn(entity);
    }

    /// Deliver damage to another entity. Only enemies take damage; returns
    /// whether the target could receive it.
    pub fn damage(&mut self, target: EntityId, amount: i32) -> bool {
        match self.neighbors.get_mut(target) {
            Some(Entity::Enemy(enemy)) => {
                enemy.damage(amount, self.settings, self.spawner);
                true
            }
            _ => false,
        }
    }
}
