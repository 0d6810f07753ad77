//! Per-frame emitter driver
//!
//! The emitter owns one pool, one influencer chain and one emission shape
//! sampler, and runs the per-frame contract: age particles down, run the
//! reset path on expiry, otherwise recompute the blend values, walk the
//! chain in order and integrate position. Surface-anchored ("static")
//! particles skip aging and integration; their position is re-derived from
//! the sequential sampler every frame instead.
//!
//! World transforms are not owned here: positions are emitter-local, and the
//! embedding scene composes them with whatever transform it gives the
//! emitter.

use crate::error::{EffectError, Result};
use crate::influencers::{Influencer, InfluencerChain, InfluencerSnapshot, StageContext};
use crate::particle::{Particle, ParticleInstance};
use crate::pool::ParticlePool;
use crate::shape::EmitterShapeSampler;
use ember_animation::Easing;
use ember_core::{Color, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Where on the emission direction a particle is released
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionPoint {
    /// Directly on the sampled surface point
    #[default]
    Center,
    /// Shifted back along the emission direction by the particle's height
    EdgeTop,
    /// Shifted forward along the emission direction by the particle's height
    EdgeBottom,
}

/// Emitter configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmitterSettings {
    /// Minimum particle lifespan in seconds
    pub life_min: f32,
    /// Maximum particle lifespan in seconds
    pub life_max: f32,
    /// Minimum emission speed
    pub force_min: f32,
    /// Maximum emission speed
    pub force_max: f32,
    /// Anchor particles to the surface instead of simulating them
    pub static_particles: bool,
    /// Offset each spawn by a random point on its face
    pub random_emission_point: bool,
    /// Where along the emission direction particles are released
    pub emission_point: EmissionPoint,
    /// Automatic emission rate; zero means manual `emit` only
    pub particles_per_second: f32,
    /// Easing applied to the normalized age to produce `interp_blend`
    pub easing: Easing,
    /// Sprite sheet columns
    pub sprite_cols: u32,
    /// Sprite sheet rows
    pub sprite_rows: u32,
    /// Emitter translation, maintained by the owning scene
    pub translation: Vec3,
    /// Seed for the emitter's random generator
    pub seed: u64,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            life_min: 1.0,
            life_max: 1.0,
            force_min: 1.0,
            force_max: 1.0,
            static_particles: false,
            random_emission_point: false,
            emission_point: EmissionPoint::Center,
            particles_per_second: 0.0,
            easing: Easing::Linear,
            sprite_cols: 1,
            sprite_rows: 1,
            translation: Vec3::ZERO,
            seed: 0,
        }
    }
}

/// Serializable emitter state for the persistence collaborator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmitterSnapshot {
    pub settings: EmitterSettings,
    pub influencers: Vec<InfluencerSnapshot>,
}

/// A particle emitter: pool, influencer chain and emission shape
pub struct Emitter {
    settings: EmitterSettings,
    chain: InfluencerChain,
    shape: EmitterShapeSampler,
    pool: ParticlePool,
    rng: SmallRng,
    active_count: usize,
    emission_carry: f32,
}

impl Emitter {
    /// Build an emitter around its own chain instance. The pool is sized to
    /// the chain's slot layout and never reallocated afterwards.
    pub fn new(
        capacity: usize,
        settings: EmitterSettings,
        chain: InfluencerChain,
        shape: EmitterShapeSampler,
    ) -> Self {
        let pool = ParticlePool::with_capacity(capacity, chain.layout());
        let rng = SmallRng::seed_from_u64(settings.seed);
        Self {
            settings,
            chain,
            shape,
            pool,
            rng,
            active_count: 0,
            emission_carry: 0.0,
        }
    }

    /// Build an emitter from a shared chain template. The template is
    /// deep-copied: configuration comes along, per-particle state never does,
    /// and the template itself stays untouched.
    pub fn from_template(
        capacity: usize,
        settings: EmitterSettings,
        template: &InfluencerChain,
        shape: EmitterShapeSampler,
    ) -> Self {
        Self::new(capacity, settings, template.duplicate(), shape)
    }

    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EmitterSettings {
        &mut self.settings
    }

    pub fn shape(&self) -> &EmitterShapeSampler {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut EmitterShapeSampler {
        &mut self.shape
    }

    pub fn chain(&self) -> &InfluencerChain {
        &self.chain
    }

    /// Append an influencer after construction, growing every record's
    /// extension-slot arrays to the new layout (existing values preserved)
    pub fn add_influencer(&mut self, influencer: Box<dyn Influencer>) {
        self.chain.add(influencer);
        self.pool.resize_slots(self.chain.layout());
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.pool.get(index)
    }

    /// Iterate the live population
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.pool.iter_active()
    }

    /// Fill `out` with one render instance per live particle
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.pool.iter_active().map(ParticleInstance::from));
    }

    /// Pure-data snapshot of settings and influencer configuration
    pub fn snapshot(&self) -> EmitterSnapshot {
        EmitterSnapshot {
            settings: self.settings.clone(),
            influencers: self.chain.snapshots(),
        }
    }

    /// Release one particle.
    ///
    /// Rolls lifespan and emission speed, takes the next face from the
    /// sequential sampler, positions and aims the particle, then runs the
    /// chain's initialize pass. Fails with `PoolExhausted` when no slot is
    /// free (the spawn is a no-op) and `ShapeNotInitialized` when the shape
    /// has no geometry yet.
    pub fn emit(&mut self) -> Result<usize> {
        let Self {
            settings,
            chain,
            shape,
            pool,
            rng,
            active_count,
            ..
        } = self;

        if !shape.is_initialized() {
            return Err(EffectError::ShapeNotInitialized);
        }
        let index = pool.acquire()?;

        let lifespan = roll(rng, settings.life_min, settings.life_max);
        let force = roll(rng, settings.force_min, settings.force_max);

        shape.set_next()?;
        let triangle_index = shape.triangle_index();
        let base = shape.next_translation()?;
        let direction = shape.next_direction()?.normalize();
        let random_offset = if settings.random_emission_point {
            shape.random_translation(rng)?
        } else {
            Vec3::ZERO
        };

        let particle = pool.record_mut(index);
        particle.active = true;
        particle.lifespan = lifespan;
        particle.life = lifespan;
        particle.blend = 0.0;
        particle.interp_blend = 0.0;
        particle.color = Color::WHITE;
        particle.alpha = 1.0;
        particle.size = Vec3::ONE;
        particle.angles = Vec3::ZERO;
        particle.sprite_col = 0;
        particle.sprite_row = 0;
        particle.sprite_index = 0;
        particle.triangle_index = triangle_index;
        particle.random_offset = random_offset;
        particle.position = base + random_offset;
        particle.velocity = direction * force;
        particle.initial_speed = particle.velocity.length();
        particle.initial_position = settings.translation;

        {
            let mut ctx = StageContext {
                shape: &mut *shape,
                settings: &*settings,
                rng: &mut *rng,
            };
            chain.initialize_all(particle, &mut ctx);
        }

        match settings.emission_point {
            EmissionPoint::Center => {}
            EmissionPoint::EdgeTop => particle.position -= direction * particle.size.y,
            EmissionPoint::EdgeBottom => particle.position += direction * particle.size.y,
        }

        *active_count += 1;
        Ok(index)
    }

    /// Advance the whole live population by `dt` seconds.
    ///
    /// Auto-emission runs first (newly released particles are simulated this
    /// frame), then each live particle ages, runs the chain and integrates.
    /// A particle whose life expires mid-frame takes the reset path and is
    /// not processed further. Stage errors abort the pass and surface to the
    /// caller.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        if self.settings.particles_per_second > 0.0 {
            self.emission_carry += self.settings.particles_per_second * dt;
            while self.emission_carry >= 1.0 {
                self.emission_carry -= 1.0;
                match self.emit() {
                    Ok(_) => {}
                    Err(EffectError::PoolExhausted { .. }) => {
                        self.emission_carry = 0.0;
                        break;
                    }
                    Err(other) => return Err(other),
                }
            }
        }

        let Self {
            settings,
            chain,
            shape,
            pool,
            rng,
            active_count,
            ..
        } = self;

        for index in 0..pool.capacity() {
            let particle = pool.record_mut(index);
            if !particle.active {
                continue;
            }

            if !settings.static_particles {
                particle.life -= dt;
                if particle.life <= 0.0 {
                    particle.active = false;
                    chain.reset_all(particle);
                    pool.release(index);
                    *active_count -= 1;
                    continue;
                }
                particle.blend = (particle.lifespan - particle.life) / particle.lifespan;
                particle.interp_blend = settings.easing.apply(particle.blend);
            }

            {
                let mut ctx = StageContext {
                    shape: &mut *shape,
                    settings: &*settings,
                    rng: &mut *rng,
                };
                chain.update_all(particle, &mut ctx, dt)?;
            }

            if settings.static_particles {
                shape.set_next_index(particle.triangle_index)?;
                let base = shape.next_translation()?;
                particle.position = if settings.random_emission_point {
                    base + particle.random_offset
                } else {
                    base
                };
            } else {
                particle.position += particle.velocity * dt;
            }
        }
        Ok(())
    }

    /// Explicitly kill one particle through the reset path
    pub fn kill(&mut self, index: usize) {
        let Self {
            chain,
            pool,
            active_count,
            ..
        } = self;
        if index >= pool.capacity() {
            return;
        }
        let particle = pool.record_mut(index);
        if !particle.active {
            return;
        }
        particle.active = false;
        chain.reset_all(particle);
        pool.release(index);
        *active_count -= 1;
    }

    /// Kill every live particle
    pub fn kill_all(&mut self) {
        for index in 0..self.pool.capacity() {
            self.kill(index);
        }
    }
}

fn roll(rng: &mut SmallRng, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        hi
    }
}
