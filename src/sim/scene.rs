//! World coordinator
//!
//! The scene owns the registry and runs the frame: dispose everything flagged
//! last frame, update the survivors in registration order, register whatever
//! they spawned, then hand the result to the display. Nothing joins or leaves
//! the registry in the middle of the update pass.

use std::time::Instant;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collider::Collider;
use super::entity::{Entity, EntityId, EntityKind, LoadContext};
use super::map::{GameMap, Wall, perimeter_positions};
use super::tank::{EnemyTank, PlayerTank, random_heading};
use super::world::{FrameContext, Hit, Neighbors, Slot, Spawner, collect_hits};
use crate::assets::Assets;
use crate::error::{ConfigError, LoadError};
use crate::input::InputEvent;
use crate::render::{Camera, DisplayGraph, RenderItem};
use crate::settings::Settings;

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Entities removed by the disposal pass
    pub disposed: usize,
    /// Entities whose update ran
    pub updated: usize,
    /// Entities flagged earlier in the frame, before their turn came
    pub skipped: usize,
    /// Spawns loaded and registered after the update pass
    pub spawned: usize,
    /// Spawns dropped because they failed to load
    pub failed: usize,
}

/// The running game world
pub struct GameScene {
    settings: Settings,
    assets: Assets,
    rng: Pcg32,
    camera: Camera,
    slots: Vec<Slot>,
    pending: Spawner,
    next_id: u32,
    frame: u64,
}

impl GameScene {
    /// Empty scene; call [`GameScene::build_world`] to populate it.
    ///
    /// Fails if the settings do not validate.
    pub fn new(settings: Settings, assets: Assets) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            camera: Camera::new(settings.camera_start),
            settings,
            assets,
            slots: Vec::new(),
            pending: Spawner::default(),
            next_id: 1,
            frame: 0,
        })
    }

    /// Populate the starting arena: ground, player, enemy, then the wall ring.
    ///
    /// Each entity that fails to load is left out and its error returned;
    /// the rest of the world is still built.
    pub fn build_world(&mut self, display: &mut dyn DisplayGraph) -> Vec<LoadError> {
        let settings = &self.settings;
        let size = settings.map_size;

        let mut entities: Vec<Entity> = vec![
            GameMap::new(Vec3::ZERO, size).into(),
            PlayerTank::new(settings.player_start).into(),
        ];
        let enemy_start = settings.enemy_start;
        let enemy_health = settings.enemy_health;
        let heading = random_heading(&mut self.rng);
        entities.push(EnemyTank::new(enemy_start, heading, enemy_health).into());
        entities.extend(perimeter_positions(size).into_iter().map(|p| Wall::new(p).into()));

        let mut errors = Vec::new();
        for entity in entities {
            if let Err(err) = self.activate(entity, display) {
                errors.push(err);
            }
        }

        log::info!(
            "World built: {} entities on a {size}x{size} map ({} failed)",
            self.slots.len(),
            errors.len()
        );
        errors
    }

    /// Load an entity and register it. A failed load leaves the scene untouched.
    pub fn activate(
        &mut self,
        entity: impl Into<Entity>,
        display: &mut dyn DisplayGraph,
    ) -> Result<EntityId, LoadError> {
        let mut entity = entity.into();
        let mut ctx = LoadContext {
            assets: &self.assets,
            settings: &self.settings,
            rng: &mut self.rng,
        };
        if let Err(err) = entity.load(&mut ctx) {
            log::warn!("Failed to load {}: {err}", entity.label());
            return Err(err);
        }
        Ok(self.add_to_scene(entity, display))
    }

    /// Register an already loaded entity and attach its visual
    pub fn add_to_scene(&mut self, entity: Entity, display: &mut dyn DisplayGraph) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        display.attach(id, &entity.core().visual);
        log::debug!("Registered {} {id}", entity.label());
        self.slots.push(Slot { id, entity });
        id
    }

    /// Queue an entity to be loaded and registered at the end of the next
    /// frame's update pass
    pub fn queue_spawn(&mut self, entity: impl Into<Entity>) {
        self.pending.spawn(entity);
    }

    /// Forward input to the entities that listen for it
    pub fn handle_input(&mut self, event: InputEvent) {
        for slot in &mut self.slots {
            slot.entity.handle_input(event);
        }
    }

    /// Run one frame of `dt` seconds
    pub fn frame(&mut self, dt: f32, display: &mut dyn DisplayGraph) -> FrameStats {
        let mut stats = FrameStats::default();

        // Disposal pass: everything flagged since the last one
        self.slots.retain_mut(|slot| {
            if !slot.entity.should_dispose() {
                return true;
            }
            display.detach(slot.id);
            if slot.entity.dispose() {
                log::debug!("Disposed {} {}", slot.entity.label(), slot.id);
            }
            stats.disposed += 1;
            false
        });

        // Update pass, registration order, against the live registry
        for index in 0..self.slots.len() {
            let (before, rest) = self.slots.split_at_mut(index);
            let Some((slot, after)) = rest.split_first_mut() else {
                break;
            };
            if slot.entity.should_dispose() {
                stats.skipped += 1;
                continue;
            }
            let mut ctx = FrameContext {
                neighbors: Neighbors::new(before, after),
                spawner: &mut self.pending,
                rng: &mut self.rng,
                camera: &mut self.camera,
                settings: &self.settings,
            };
            slot.entity.update(dt, &mut ctx);
            stats.updated += 1;
        }

        // Spawns join now and update from the next frame on
        let spawned: Vec<Entity> = self.pending.drain().collect();
        for entity in spawned {
            match self.activate(entity, display) {
                Ok(_) => stats.spawned += 1,
                Err(_) => stats.failed += 1,
            }
        }

        let items: Vec<RenderItem> = self
            .slots
            .iter()
            .map(|slot| slot.entity.render_item(slot.id))
            .collect();
        display.redraw(&self.camera, &items);

        self.frame += 1;
        log::trace!("Frame {}: {stats:?}", self.frame);
        stats
    }

    /// Registered entities whose collider intersects `candidate`
    pub fn colliding(&self, candidate: &Collider, include: impl Fn(EntityKind) -> bool) -> Vec<Hit> {
        collect_hits(self.slots.iter(), candidate, include)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.entity)
    }

    /// Registered entities in update order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().map(|slot| (slot.id, &slot.entity))
    }

    /// First registered entity of `kind`
    pub fn find_kind(&self, kind: EntityKind) -> Option<(EntityId, &Entity)> {
        self.entities().find(|(_, entity)| entity.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Spawns waiting for the end of the next update pass
    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Frames run so far
    pub fn frame_index(&self) -> u64 {
        self.frame
    }
}

/// Wall-clock frame timer for the native loop
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
        }
    }

    /// Seconds since the previous call, clamped so a stall never produces a
    /// huge simulation step
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(self.max_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ENEMY_BODY_TEXTURE;
    use crate::input::Direction;
    use crate::render::{HeadlessDisplay, Visual};
    use crate::sim::bullet::Bullet;
    use crate::sim::collider::Sphere;
    use crate::sim::effects::Explosion;

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> (GameScene, HeadlessDisplay) {
        let mut scene = GameScene::new(Settings::default(), Assets::builtin()).unwrap();
        let mut display = HeadlessDisplay::new();
        let errors = scene.build_world(&mut display);
        assert!(errors.is_empty(), "{errors:?}");
        (scene, display)
    }

    fn count_label(scene: &GameScene, label: &str) -> usize {
        scene.entities().filter(|(_, e)| e.label() == label).count()
    }

    fn enemy_id(scene: &GameScene) -> EntityId {
        scene.find_kind(EntityKind::Enemy).map(|(id, _)| id).unwrap()
    }

    #[test]
    fn test_build_world() {
        let (scene, display) = scene();
        // Map + player + enemy + 4 * 14 walls
        assert_eq!(scene.len(), 59);
        assert_eq!(display.attached_count(), 59);
        assert_eq!(count_label(&scene, "wall"), 56);

        let labels: Vec<_> = scene.entities().take(3).map(|(_, e)| e.label()).collect();
        assert_eq!(labels, vec!["map", "player", "enemy"]);

        let (_, player) = scene.find_kind(EntityKind::Player).unwrap();
        assert_eq!(player.position(), Vec3::new(7.0, 7.0, 0.0));
        let enemy = scene.get(enemy_id(&scene)).unwrap();
        assert_eq!(enemy.position(), Vec3::new(3.0, 3.0, 0.0));
        assert_eq!(enemy.as_enemy().unwrap().health(), 100);
        assert_eq!(scene.camera().position, Vec3::new(7.0, 7.0, 15.0));
    }

    #[test]
    fn test_failed_load_skips_only_that_entity() {
        let mut assets = Assets::new();
        let builtin = Assets::builtin();
        for texture in builtin.ground_textures() {
            assets.add_ground_texture(&texture.name).unwrap();
        }
        for name in ["tank-body", "tank-turret", "tank-turret-red", "wall"] {
            assets.add_texture(name).unwrap();
        }
        assets
            .add_model(builtin.model("tank").unwrap().clone())
            .unwrap();

        let mut scene = GameScene::new(Settings::default(), assets).unwrap();
        let mut display = HeadlessDisplay::new();
        let errors = scene.build_world(&mut display);

        assert_eq!(
            errors,
            vec![LoadError::MissingTexture(ENEMY_BODY_TEXTURE.into())]
        );
        assert_eq!(scene.len(), 58);
        assert!(scene.find_kind(EntityKind::Enemy).is_none());
    }

    #[test]
    fn test_every_live_entity_updates_once() {
        let (mut scene, mut display) = scene();
        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.disposed, 0);
        assert_eq!(stats.updated + stats.skipped, scene.len());
        assert_eq!(stats.updated, 59);
        assert_eq!(display.frames(), 1);
        assert_eq!(display.last_items().len(), 59);
        assert_eq!(scene.frame_index(), 1);
    }

    #[test]
    fn test_flagged_entity_disposed_exactly_once() {
        let (mut scene, mut display) = scene();
        let enemy = enemy_id(&scene);
        scene.get_mut(enemy).unwrap().core_mut().mark_for_disposal();

        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.disposed, 1);
        assert_eq!(stats.updated + stats.skipped, scene.len());
        assert!(scene.get(enemy).is_none());
        assert_eq!(display.detached(), &[enemy]);
        assert!(!display.is_attached(enemy));

        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.disposed, 0);
        assert_eq!(display.detached().len(), 1);
    }

    #[test]
    fn test_entity_flagged_before_its_turn_is_skipped() {
        let mut scene = GameScene::new(Settings::default(), Assets::builtin()).unwrap();
        let mut display = HeadlessDisplay::new();
        let target = Vec3::new(3.0, 3.0, 0.0);
        // The bullet updates first and destroys the enemy behind it
        let bullet = scene
            .activate(Bullet::new(target + Vec3::new(0.0, 0.7, 0.25), 0.0), &mut display)
            .unwrap();
        let enemy = scene
            .activate(EnemyTank::new(target, 0.0, 20), &mut display)
            .unwrap();

        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.skipped, 1);
        // Impact explosion and tank explosion
        assert_eq!(stats.spawned, 2);
        assert_eq!(scene.get(enemy).unwrap().position(), target);

        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.disposed, 2);
        assert!(scene.get(bullet).is_none());
        assert!(scene.get(enemy).is_none());
        assert_eq!(count_label(&scene, "explosion"), 2);
    }

    #[test]
    fn test_spawns_join_after_update_pass() {
        let (mut scene, mut display) = scene();
        scene.handle_input(InputEvent::Fire);

        let before = scene.len();
        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.spawned, 2);
        assert_eq!(stats.updated, before);
        assert_eq!(scene.len(), before + 2);
        assert_eq!(count_label(&scene, "bullet"), 1);
        assert_eq!(count_label(&scene, "shoot"), 1);

        // The new bullet has not moved until its first update
        let (bullet_id, bullet) = scene.find_kind(EntityKind::Bullet).unwrap();
        let launched_at = bullet.position();
        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.updated, before + 2);
        assert_ne!(scene.get(bullet_id).unwrap().position(), launched_at);
    }

    #[test]
    fn test_failed_spawn_is_dropped() {
        let mut scene = GameScene::new(Settings::default(), Assets::new()).unwrap();
        let mut display = HeadlessDisplay::new();
        scene.queue_spawn(Wall::new(Vec3::ZERO));
        let stats = scene.frame(DT, &mut display);
        assert_eq!(stats.failed, 1);
        assert!(scene.is_empty());
        assert_eq!(scene.pending_spawns(), 0);
    }

    #[test]
    fn test_bullet_hit_damages_enemy() {
        let (mut scene, mut display) = scene();
        let enemy = enemy_id(&scene);
        let target = scene.get(enemy).unwrap().position();
        // Just above the enemy, flying toward it
        scene.queue_spawn(Bullet::new(target + Vec3::new(0.0, 0.7, 0.25), 0.0));
        scene.frame(DT, &mut display);

        let mut hit = false;
        for _ in 0..10 {
            let stats = scene.frame(DT, &mut display);
            if count_label(&scene, "explosion") > 0 {
                hit = true;
                assert!(stats.spawned >= 1);
                break;
            }
        }
        assert!(hit);
        assert_eq!(scene.get(enemy).unwrap().as_enemy().unwrap().health(), 80);
    }

    #[test]
    fn test_destroyed_enemy_leaves_one_explosion() {
        let settings = Settings {
            enemy_health: 20,
            ..Settings::default()
        };
        let mut scene = GameScene::new(settings, Assets::builtin()).unwrap();
        let mut display = HeadlessDisplay::new();
        scene.build_world(&mut display);
        let enemy = enemy_id(&scene);
        let target = scene.get(enemy).unwrap().position();

        // Two bullets land in the same frame
        for dx in [-0.05, 0.05] {
            scene.queue_spawn(Bullet::new(target + Vec3::new(dx, 0.7, 0.25), 0.0));
        }
        scene.frame(DT, &mut display);
        for _ in 0..10 {
            scene.frame(DT, &mut display);
            if scene.get(enemy).is_none() {
                break;
            }
        }

        assert!(scene.get(enemy).is_none());
        let big = scene
            .entities()
            .filter(|(_, e)| matches!(e, Entity::Explosion(x) if x.size() == 2.0))
            .count();
        assert_eq!(big, 1);
    }

    #[test]
    fn test_effects_expire_and_leave() {
        let (mut scene, mut display) = scene();
        scene.queue_spawn(Explosion::new(Vec3::new(5.0, 5.0, 0.0), 1.0, 0.5));
        scene.frame(DT, &mut display);
        assert_eq!(count_label(&scene, "explosion"), 1);
        for _ in 0..40 {
            scene.frame(DT, &mut display);
        }
        assert_eq!(count_label(&scene, "explosion"), 0);
        assert_eq!(scene.len(), 59);
    }

    #[test]
    fn test_player_drives_into_wall_and_stops() {
        let (mut scene, mut display) = scene();
        scene.handle_input(InputEvent::Pressed(Direction::Up));
        for _ in 0..600 {
            scene.frame(DT, &mut display);
        }
        let (_, player) = scene.find_kind(EntityKind::Player).unwrap();
        // Facing -Y, the wall ring sits at y = 0
        assert!(player.position().y > 0.5);
        assert!(player.position().y < 7.0);
        assert_eq!(scene.camera().position.y, player.position().y);
    }

    #[test]
    fn test_scene_query_sees_everything() {
        let (scene, _) = scene();
        let probe = Collider::Sphere(Sphere::new(Vec3::new(7.0, 7.0, 0.25), 0.2));
        let hits = scene.colliding(&probe, |_| true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, EntityKind::Player);
    }

    #[test]
    fn test_same_seed_same_world() {
        let run = || {
            let (mut scene, mut display) = scene();
            scene.handle_input(InputEvent::Fire);
            for _ in 0..300 {
                scene.frame(DT, &mut display);
            }
            scene
                .entities()
                .map(|(id, e)| (id, e.position()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = Settings {
            explosion_duration: 0.0,
            ..Settings::default()
        };
        let err = GameScene::new(settings, Assets::builtin()).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { field: "explosion_duration", .. }));
    }

    #[test]
    fn test_display_sees_explosion_animate() {
        let (mut scene, mut display) = scene();
        scene.queue_spawn(Explosion::new(Vec3::new(5.0, 5.0, 0.0), 1.0, 0.5));
        scene.frame(0.1, &mut display);
        let (id, _) = scene
            .entities()
            .find(|(_, e)| e.label() == "explosion")
            .unwrap();
        assert!(matches!(display.visual(id), Some(Visual::Particles { smoke: 0, .. })));

        scene.frame(0.1, &mut display);
        let first = display.last_item(id).unwrap().clone();
        scene.frame(0.1, &mut display);
        let second = display.last_item(id).unwrap();

        assert!(!first.particles.is_empty());
        assert_eq!(first.particles.len(), second.particles.len());
        assert_ne!(first.particles, second.particles);
        for (a, b) in first.particles.iter().zip(&second.particles) {
            assert!(b.size.abs() < a.size.abs() || a.size == 0.0);
        }
    }

    #[test]
    fn test_frame_clock_clamps() {
        let mut clock = FrameClock::new(0.1);
        std::thread::sleep(std::time::Duration::from_millis(150));
        assert_eq!(clock.delta(), 0.1);
        assert!(clock.delta() < 0.1);
    }
}
