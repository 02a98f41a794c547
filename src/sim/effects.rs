//! Timed particle effects
//!
//! Effects never collide. Particles are rolled once at load and animated from
//! the effect timer; the effect flags itself the frame its time runs out.

use glam::Vec3;
use rand::Rng;

use super::entity::{EntityCore, EntityKind, GameEntity, LoadContext};
use super::world::FrameContext;
use crate::consts::*;
use crate::error::LoadError;
use crate::render::{ParticleInstance, ParticleKind, Visual};
use crate::{heading, random_int_in_range, random_sign};

/// Countdown shared by every effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTimer {
    duration: f32,
    elapsed: f32,
}

impl EffectTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance the clock; returns true once the effect has run its course
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.expired()
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Seconds left (never negative)
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    /// Remaining time as a fraction of the duration, 1.0 → 0.0
    pub fn fraction_remaining(&self) -> f32 {
        self.remaining() / self.duration
    }
}

/// One animated particle, positioned relative to its effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Direction of travel (rotation around +Z)
    pub angle: f32,
    pub speed: f32,
    /// Base size at full scale
    pub size: f32,
    pub offset: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

impl Particle {
    fn moving(angle: f32, speed: f32, size: f32) -> Self {
        Self {
            angle,
            speed,
            size,
            offset: Vec3::ZERO,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    fn instance(&self, kind: ParticleKind) -> ParticleInstance {
        ParticleInstance {
            kind,
            offset: self.offset,
            size: self.size * self.scale,
            opacity: self.opacity,
        }
    }
}

/// Burst of fire particles flying outward and shrinking
#[derive(Debug, Clone)]
pub struct Explosion {
    core: EntityCore,
    size: f32,
    timer: EffectTimer,
    particles: Vec<Particle>,
}

impl Explosion {
    pub fn new(position: Vec3, size: f32, duration: f32) -> Self {
        Self {
            core: EntityCore::new(position, EntityKind::General),
            size,
            timer: EffectTimer::new(duration),
            particles: Vec::new(),
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Current particle state for the display
    pub fn particle_instances(&self) -> Vec<ParticleInstance> {
        self.particles
            .iter()
            .map(|p| p.instance(ParticleKind::Fire))
            .collect()
    }
}

impl GameEntity for Explosion {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        let rng = &mut *ctx.rng;
        let (min, max) = EXPLOSION_PARTICLES;
        let count = random_int_in_range(rng, min, max);

        self.particles = (0..count)
            .map(|_| {
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                let size = 0.3 * self.size + rng.random::<f32>() * self.size * 0.4 * random_sign(rng);
                let speed = 0.5 + rng.random::<f32>() * 2.5;
                Particle::moving(angle, speed, size)
            })
            .collect();

        self.core.visual = Visual::Particles {
            fire: self.particles.len(),
            smoke: 0,
        };
        Ok(())
    }

    fn update(&mut self, dt: f32, _ctx: &mut FrameContext<'_>) {
        if self.timer.advance(dt) {
            self.core.mark_for_disposal();
            return;
        }

        let scale = self.timer.fraction_remaining();
        for particle in &mut self.particles {
            particle.offset += heading(particle.angle) * particle.speed * dt;
            particle.scale = scale;
        }
    }

    fn release(&mut self) {
        self.particles.clear();
    }
}

/// Muzzle flash: fire along the barrel plus a puff of rising smoke
#[derive(Debug, Clone)]
pub struct ShootEffect {
    core: EntityCore,
    particle_size: f32,
    timer: EffectTimer,
    fire: Vec<Particle>,
    smoke: Vec<Particle>,
}

impl ShootEffect {
    pub fn new(position: Vec3, angle: f32, duration: f32, particle_size: f32) -> Self {
        let mut core = EntityCore::new(position, EntityKind::General);
        core.rotation = angle;
        Self {
            core,
            particle_size,
            timer: EffectTimer::new(duration),
            fire: Vec::new(),
            smoke: Vec::new(),
        }
    }

    pub fn fire(&self) -> &[Particle] {
        &self.fire
    }

    pub fn smoke(&self) -> &[Particle] {
        &self.smoke
    }

    /// Current particle state for the display, fire first
    pub fn particle_instances(&self) -> Vec<ParticleInstance> {
        let fire = self.fire.iter().map(|p| p.instance(ParticleKind::Fire));
        let smoke = self.smoke.iter().map(|p| p.instance(ParticleKind::Smoke));
        fire.chain(smoke).collect()
    }
}

/// Smoke drift speed along +Z (units per second)
const SMOKE_RISE: f32 = 3.0;
/// Largest fire spread off the barrel axis (radians)
const FIRE_JITTER: f32 = std::f32::consts::PI * 0.08;

impl GameEntity for ShootEffect {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn load(&mut self, ctx: &mut LoadContext<'_>) -> Result<(), LoadError> {
        let rng = &mut *ctx.rng;
        let (min, max) = SHOOT_PARTICLES;
        let count = random_int_in_range(rng, min, max);
        let size = self.particle_size;

        self.fire.clear();
        self.smoke.clear();
        for _ in 0..count {
            let jitter = FIRE_JITTER * rng.random::<f32>() * random_sign(rng);
            let speed = 1.75 * rng.random::<f32>() * 3.0;
            self.fire
                .push(Particle::moving(self.core.rotation + jitter, speed, size));

            let mut smoke = Particle::moving(0.0, 0.0, size);
            smoke.offset = Vec3::new(
                rng.random::<f32>() * size * random_sign(rng),
                rng.random::<f32>() * size * random_sign(rng),
                rng.random::<f32>() * size * random_sign(rng),
            );
            self.smoke.push(smoke);
        }

        self.core.visual = Visual::Particles {
            fire: self.fire.len(),
            smoke: self.smoke.len(),
        };
        Ok(())
    }

    fn update(&mut self, dt: f32, _ctx: &mut FrameContext<'_>) {
        if self.timer.advance(dt) {
            self.core.mark_for_disposal();
            return;
        }

        let remaining = self.timer.remaining();
        for particle in &mut self.fire {
            // Fire slows down as the flash dies
            particle.offset += heading(particle.angle) * particle.speed * dt * remaining * 0.75;
            particle.scale = remaining;
        }

        let opacity = self.timer.fraction_remaining();
        for particle in &mut self.smoke {
            particle.opacity = opacity;
            particle.offset.z += SMOKE_RISE * dt;
        }
    }

    fn release(&mut self) {
        self.fire.clear();
        self.smoke.clear();
    }
}
