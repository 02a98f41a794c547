//! Player and enemy tanks
//!
//! Both move the same way: compute a tentative displacement, test the
//! translated collider against everything except bullets, then either commit
//! position and collider together or discard the whole move.

use glam::Vec3;
use rand::Rng;

use super::bullet::Bullet;
use super::collider::{Collider, Sphere};
use super::effects::{Explosion, ShootEffect};
use super::entity::{EntityCore, EntityKind, GameEntity, LoadContext};
use super::world::{FrameContext, Spawner};
use crate::consts::*;
use crate::error::LoadError;
use crate::input::{InputEvent, KeyboardState};
use crate::render::Visual;
use crate::settings::Settings;
use crate::{heading, wrap_angle};

/// Random whole-radian heading in `[0, 6]`
pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.random::<f32>() * std::f32::consts::TAU).floor()
}

/// Build a tank's visual and collider from the shared tank model
fn load_tank(
    core: &mut EntityCore,
    ctx: &LoadContext<'_>,
    body_texture: &str,
    turret_texture: &str,
) -> Result<(), LoadError> {
    let model = ctx.assets.require_model(TANK_MODEL)?;
    let body = model.require_part(TANK_BODY_PART)?;
    let turret = model.require_part(TANK_TURRET_PART)?;
    let body_texture = ctx.assets.require_texture(body_texture)?;
    let turret_texture = ctx.assets.require_texture(turret_texture)?;

    // Sphere around the whole model, shrunk so tanks can graze each other
    let bounds = body.bounds().union(&turret.bounds()).translated(core.position);
    let sphere = bounds.bounding_sphere();
    core.collider = Some(Collider::Sphere(Sphere::new(
        sphere.center,
        sphere.radius * ctx.settings.tank_collider_scale,
    )));
    core.visual = Visual::Tank {
        body: body_texture.clone(),
        turret: turret_texture.clone(),
    };
    Ok(())
}

/// Commit `displacement` unless the moved collider would hit a non-bullet.
///
/// Returns whether the move was committed. A tank without a collider or a
/// zero displacement never queries the world.
fn try_move(core: &mut EntityCore, displacement: Vec3, ctx: &FrameContext<'_>) -> bool {
    if displacement == Vec3::ZERO {
        return true;
    }
    let Some(collider) = core.collider else {
        return false;
    };

    let tentative = collider.translated(displacement);
    let blocked = !ctx
        .colliding(&tentative, |kind| kind != EntityKind::Bullet)
        .is_empty();
    if blocked {
        return false;
    }

    core.position += displacement;
    core.collider = Some(tentative);
    true
}

/// The player-controlled tank
#[derive(Debug, Clone)]
pub struct PlayerTank {
    core: EntityCore,
    keys: KeyboardState,
    queued_shots: u32,
}

impl PlayerTank {
    pub fn new(position: Vec3) -> Self {
        Self {
            core: EntityCore::new(position, EntityKind::Player),
            keys: KeyboardState::default(),
            queued_shots: 0,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.core.rotation
    }

    pub fn keys(&self) -> KeyboardState {
        self.keys
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(direction) => self.keys.set(direction, true),
            InputEvent::Released(direction) => self.keys.set(direction, false),
            InputEvent::Fire => self.queued_shots += 1,
        }
    }

    /// Spawn a muzzle effect and a bullet just ahead of the tank
    fn shoot(&self, ctx: &mut FrameContext<'_>) {
        let settings = ctx.settings;
        let rotation = self.core.rotation;
        let muzzle = self.core.position
            + heading(rotation) * settings.muzzle_forward
            + Vec3::Z * settings.muzzle_height;

        ctx.spawn(ShootEffect::new(
            muzzle,
            rotation,
            settings.shoot_duration,
            settings.shoot_particle_size,
        ));
        ctx.spawn(Bullet::new(muzzle, rotation));
        log::debug!("Player fired at heading {rotation:.2}");
    }
}

impl GameEntity for PlayerTank {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        load_tank(&mut self.core, ctx, PLAYER_BODY_TEXTURE, PLAYER_TURRET_TEXTURE)
    }

    fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        for _ in 0..std::mem::take(&mut self.queued_shots) {
            self.shoot(ctx);
        }

        let settings = ctx.settings;
        // Rotation applies even when the move below is blocked
        self.core.rotation =
            wrap_angle(self.core.rotation + self.keys.turn() * settings.player_turn_rate * dt);

        let displacement =
            heading(self.core.rotation) * settings.player_move_speed * dt * self.keys.drive();
        // Standing still is not a move; the camera stays where it is
        if displacement != Vec3::ZERO && try_move(&mut self.core, displacement, ctx) {
            ctx.camera.follow(self.core.position);
        }
    }
}

/// The wandering enemy tank
#[derive(Debug, Clone)]
pub struct EnemyTank {
    core: EntityCore,
    health: i32,
    heading: f32,
}

impl EnemyTank {
    pub fn new(position: Vec3, heading: f32, health: i32) -> Self {
        Self {
            core: EntityCore::new(position, EntityKind::Enemy),
            health,
            heading,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }

    /// Apply damage. The hit that takes health to zero or below flags the
    /// tank and spawns its explosion; hits after that are ignored.
    ///
    /// Returns true if this call destroyed the tank.
    pub fn damage(&mut self, amount: i32, settings: &Settings, spawner: &mut Spawner) -> bool {
        if self.core.should_dispose() {
            return false;
        }

        self.health -= amount;
        if self.health > 0 {
            return false;
        }

        self.core.mark_for_disposal();
        spawner.spawn(Explosion::new(
            self.core.position,
            settings.tank_explosion_size,
            settings.explosion_duration,
        ));
        log::info!("Enemy tank destroyed");
        true
    }
}

impl GameEntity for EnemyTank {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        load_tank(&mut self.core, ctx, ENEMY_BODY_TEXTURE, ENEMY_TURRET_TEXTURE)
    }

    fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        let displacement = heading(self.heading) * ctx.settings.enemy_move_speed * dt;
        if try_move(&mut self.core, displacement, ctx) {
            self.core.rotation = self.heading;
        } else {
            self.heading = random_heading(ctx.rng);
        }
    }
}
