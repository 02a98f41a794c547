//! Projectiles
//!
//! A bullet flies straight at constant speed until its collider touches
//! anything other than the player, then detonates: it flags itself, leaves an
//! explosion at the impact point, and damages the first enemy it touched.

use glam::Vec3;

use super::collider::{Aabb, Collider, Sphere};
use super::effects::Explosion;
use super::entity::{EntityCore, EntityKind, GameEntity, LoadContext};
use super::world::FrameContext;
use crate::consts::BULLET_COLOR;
use crate::error::LoadError;
use crate::heading;
use crate::render::Visual;

#[derive(Debug, Clone)]
pub struct Bullet {
    core: EntityCore,
    /// Seconds since launch
    age: f32,
}

impl Bullet {
    /// A bullet at `position` travelling along rotation `angle`
    pub fn new(position: Vec3, angle: f32) -> Self {
        let mut core = EntityCore::new(position, EntityKind::Bullet);
        core.rotation = angle;
        Self { core, age: 0.0 }
    }

    pub fn angle(&self) -> f32 {
        self.core.rotation
    }

    pub fn age(&self) -> f32 {
        self.age
    }
}

impl GameEntity for Bullet {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        let radius = ctx.settings.bullet_radius;
        self.core.visual = Visual::Ball {
            radius,
            color: BULLET_COLOR,
        };
        // Bounding sphere of the ball's bounding box
        let bounds = Aabb::cube(self.core.position, radius * 2.0);
        self.core.collider = Some(Collider::Sphere(Sphere::new(
            self.core.position,
            bounds.bounding_sphere().radius,
        )));
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut FrameContext<'_>) {
        let settings = ctx.settings;

        self.age += dt;
        if self.age >= settings.bullet_lifetime {
            log::debug!("Bullet expired without a hit");
            self.core.mark_for_disposal();
            return;
        }

        self.core
            .translate(heading(self.core.rotation) * settings.bullet_speed * dt);

        let Some(collider) = self.core.collider else {
            return;
        };
        let hits = ctx.colliding(&collider, |kind| kind != EntityKind::Player);
        if hits.is_empty() {
            return;
        }

        self.core.mark_for_disposal();
        ctx.spawn(Explosion::new(
            self.core.position,
            settings.impact_explosion_size,
            settings.explosion_duration,
        ));

        if let Some(enemy) = hits.iter().find(|hit| hit.kind == EntityKind::Enemy) {
            ctx.damage(enemy.id, settings.bullet_damage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Entity;
    use crate::sim::map::Wall;
    use crate::sim::tank::{EnemyTank, PlayerTank};
    use crate::sim::world::testing::*;

    /// Bullet 0.7 above an enemy's collider, flying toward it (-Y)
    fn bullet_over(x: f32, y: f32) -> Bullet {
        Bullet::new(Vec3::new(x, y + 0.7, 0.25), 0.0)
    }

    #[test]
    fn test_flies_straight_when_clear() {
        let mut h = Harness::new();
        let mut bullet = h.load(Bullet::new(Vec3::new(7.0, 7.0, 0.5), 0.0));
        h.update(&mut bullet, 0.1);
        assert!((bullet.position() - Vec3::new(7.0, 6.1, 0.5)).length() < 1e-5);
        assert_eq!(bullet.collider().unwrap().center(), bullet.position());
        assert!(!bullet.should_dispose());
        assert!(h.spawner.is_empty());
    }

    #[test]
    fn test_hit_damages_enemy_and_detonates() {
        let mut h = Harness::new();
        let enemy = h.add(EnemyTank::new(at(3.0, 3.0), 0.0, 100));
        let mut bullet = h.load(bullet_over(3.0, 3.0));

        h.update(&mut bullet, 0.05);

        assert!(bullet.should_dispose());
        assert_eq!(h.get(enemy).as_enemy().unwrap().health(), 80);
        assert_eq!(h.spawner.len(), 1);
        assert!(matches!(h.spawner.pending()[0], Entity::Explosion(_)));
    }

    #[test]
    fn test_only_first_enemy_damaged() {
        let mut h = Harness::new();
        let first = h.add(EnemyTank::new(at(3.0, 3.0), 0.0, 100));
        let second = h.add(EnemyTank::new(at(3.1, 3.0), 0.0, 100));
        let mut bullet = h.load(bullet_over(3.05, 3.0));

        h.update(&mut bullet, 0.05);

        assert_eq!(h.get(first).as_enemy().unwrap().health(), 80);
        assert_eq!(h.get(second).as_enemy().unwrap().health(), 100);
    }

    #[test]
    fn test_wall_hit_explodes_without_damage() {
        let mut h = Harness::new();
        h.add(Wall::new(at(7.0, 5.0)));
        let mut bullet = h.load(Bullet::new(Vec3::new(7.0, 6.0, 0.25), 0.0));

        h.update(&mut bullet, 0.1);

        assert!(bullet.should_dispose());
        assert_eq!(h.spawner.len(), 1);
    }

    #[test]
    fn test_passes_through_player() {
        let mut h = Harness::new();
        h.add(PlayerTank::new(at(7.0, 6.0)));
        let mut bullet = h.load(Bullet::new(Vec3::new(7.0, 6.6, 0.25), 0.0));

        h.update(&mut bullet, 0.05);

        assert!(!bullet.should_dispose());
        assert!(h.spawner.is_empty());
    }

    #[test]
    fn test_lifetime_cap() {
        let mut h = Harness::new();
        let mut bullet = h.load(Bullet::new(Vec3::new(7.0, 7.0, 0.5), 0.0));
        for _ in 0..3 {
            h.update(&mut bullet, 1.0);
        }
        let Entity::Bullet(flying) = &bullet else {
            unreachable!();
        };
        assert_eq!(flying.age(), 3.0);
        assert_eq!(flying.angle(), 0.0);
        assert!(!bullet.should_dispose());
        h.update(&mut bullet, 1.0);
        assert!(bullet.should_dispose());
        assert!(h.spawner.is_empty());
    }
}
