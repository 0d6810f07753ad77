//! Radial velocity influencer
//!
//! Shapes each particle's velocity into an orbit around a pull point: a
//! radial component pulls toward the point (scaled by the particle's spawn
//! speed) while a tangential component, stored per particle in a float slot,
//! pushes it sideways. The pull point is either the particle's own emission
//! point (re-derived each frame from its stored triangle index) or the
//! center of the emission surface.

use crate::error::Result;
use crate::influencers::{Influencer, InfluencerConfig, InfluencerSnapshot, StageContext};
use crate::particle::Particle;
use crate::pool::{FloatSlot, SlotRegistry};
use ember_core::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where the pull point comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadialPullAlignment {
    /// The particle's own emission point on the surface
    #[default]
    EmissionPoint,
    /// The center of the emission surface's bounds
    EmitterCenter,
}

/// Which axes of the pull point follow the particle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadialPullCenter {
    /// Use the pull point as-is
    #[default]
    Absolute,
    /// Substitute the particle's X, orbiting in the YZ plane
    PositionX,
    /// Substitute the particle's Y, orbiting in the XZ plane
    PositionY,
    /// Substitute the particle's Z, orbiting in the XY plane
    PositionZ,
}

/// Up reference for deriving the orbit frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadialUpAlignment {
    /// The current emission face's normal
    Normal,
    UnitX,
    #[default]
    UnitY,
    UnitZ,
}

/// Orbit/spiral velocity shaping
#[derive(Clone)]
pub struct RadialVelocityInfluencer {
    radial_pull: f32,
    tangent_force: f32,
    pull_alignment: RadialPullAlignment,
    pull_center: RadialPullCenter,
    up_alignment: RadialUpAlignment,
    random_direction: bool,
    enabled: bool,
    tangent_slot: Option<FloatSlot>,
}

impl Default for RadialVelocityInfluencer {
    fn default() -> Self {
        Self::new()
    }
}

impl RadialVelocityInfluencer {
    pub fn new() -> Self {
        Self {
            radial_pull: 1.0,
            tangent_force: 1.0,
            pull_alignment: RadialPullAlignment::default(),
            pull_center: RadialPullCenter::default(),
            up_alignment: RadialUpAlignment::default(),
            random_direction: false,
            enabled: true,
            tangent_slot: None,
        }
    }

    /// Pull strength toward the pull point (how the orbit tightens)
    pub fn set_radial_pull(&mut self, radial_pull: f32) {
        self.radial_pull = radial_pull;
    }

    pub fn radial_pull(&self) -> f32 {
        self.radial_pull
    }

    /// Sideways force driving the orbit
    pub fn set_tangent_force(&mut self, tangent_force: f32) {
        self.tangent_force = tangent_force;
    }

    pub fn tangent_force(&self) -> f32 {
        self.tangent_force
    }

    pub fn set_pull_alignment(&mut self, alignment: RadialPullAlignment) {
        self.pull_alignment = alignment;
    }

    pub fn pull_alignment(&self) -> RadialPullAlignment {
        self.pull_alignment
    }

    pub fn set_pull_center(&mut self, center: RadialPullCenter) {
        self.pull_center = center;
    }

    pub fn pull_center(&self) -> RadialPullCenter {
        self.pull_center
    }

    pub fn set_up_alignment(&mut self, alignment: RadialUpAlignment) {
        self.up_alignment = alignment;
    }

    pub fn up_alignment(&self) -> RadialUpAlignment {
        self.up_alignment
    }

    /// Randomly reverse the orbit direction per particle
    pub fn set_random_direction(&mut self, random_direction: bool) {
        self.random_direction = random_direction;
    }

    pub fn random_direction(&self) -> bool {
        self.random_direction
    }
}

impl Influencer for RadialVelocityInfluencer {
    fn name(&self) -> &'static str {
        "radial-velocity"
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.tangent_slot = Some(registry.register_float_slot());
    }

    fn initialize(&mut self, particle: &mut Particle, ctx: &mut StageContext<'_>) {
        let Some(slot) = self.tangent_slot else { return };
        let force = if self.random_direction && ctx.rng.gen::<bool>() {
            -self.tangent_force
        } else {
            self.tangent_force
        };
        particle.set_float_data(slot, force);
    }

    fn update(
        &mut self,
        particle: &mut Particle,
        ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()> {
        let Some(slot) = self.tangent_slot else {
            return Ok(());
        };

        let mut pull_point = match self.pull_alignment {
            RadialPullAlignment::EmissionPoint => {
                ctx.shape.set_next_index(particle.triangle_index)?;
                let mut point = ctx.shape.next_translation()?;
                if ctx.settings.random_emission_point {
                    point += particle.random_offset;
                }
                point
            }
            RadialPullAlignment::EmitterCenter => ctx.shape.center()?,
        };

        match self.pull_center {
            RadialPullCenter::Absolute => {}
            RadialPullCenter::PositionX => pull_point.x = particle.position.x,
            RadialPullCenter::PositionY => pull_point.y = particle.position.y,
            RadialPullCenter::PositionZ => pull_point.z = particle.position.z,
        }

        let radial = (pull_point - particle.position).normalize()
            * (particle.initial_speed * self.radial_pull * dt);

        let up_reference = match self.up_alignment {
            RadialUpAlignment::Normal => ctx.shape.next_direction()?,
            RadialUpAlignment::UnitX => Vec3::UNIT_X,
            RadialUpAlignment::UnitY => Vec3::UNIT_Y,
            RadialUpAlignment::UnitZ => Vec3::UNIT_Z,
        };

        let up = radial.cross(up_reference).normalize();
        let left = radial.cross(up).normalize();
        let tangent = radial.cross(left).normalize() * particle.float_data(slot) * dt;

        particle.velocity -= tangent;
        particle.velocity += radial * self.radial_pull;
        Ok(())
    }

    fn reset(&mut self, particle: &mut Particle) {
        if let Some(slot) = self.tangent_slot {
            particle.set_float_data(slot, 0.0);
        }
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn duplicate(&self) -> Box<dyn Influencer> {
        Box::new(self.clone())
    }

    fn snapshot(&self) -> InfluencerSnapshot {
        InfluencerSnapshot {
            name: self.name().to_string(),
            enabled: self.enabled,
            config: InfluencerConfig::RadialVelocity {
                radial_pull: self.radial_pull,
                tangent_force: self.tangent_force,
                pull_alignment: self.pull_alignment,
                pull_center: self.pull_center,
                up_alignment: self.up_alignment,
                random_direction: self.random_direction,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterSettings;
    use crate::influencers::InfluencerChain;
    use crate::pool::ParticlePool;
    use crate::shape::EmitterShapeSampler;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn orbiter() -> RadialVelocityInfluencer {
        let mut radial = RadialVelocityInfluencer::new();
        radial.set_pull_alignment(RadialPullAlignment::EmitterCenter);
        radial
    }

    #[test]
    fn orbit_frame_produces_radial_and_tangential_velocity() {
        let mut chain = InfluencerChain::new();
        chain.add(Box::new(orbiter()));
        let mut pool = ParticlePool::with_capacity(1, chain.layout());

        // A quad whose bounds center on the origin, so the pull point is
        // exactly (0, 0, 0).
        let positions = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let mut shape = EmitterShapeSampler::new();
        shape.init_from_mesh(&positions, &indices).unwrap();

        let settings = EmitterSettings::default();
        let mut rng = SmallRng::seed_from_u64(3);

        let index = pool.acquire().unwrap();
        let particle = pool.get_mut(index).unwrap();
        particle.position = Vec3::new(1.0, 0.0, 0.0);
        particle.initial_speed = 1.0;
        particle.lifespan = 1.0;

        let mut ctx = StageContext {
            shape: &mut shape,
            settings: &settings,
            rng: &mut rng,
        };
        chain.initialize_all(particle, &mut ctx);
        let mut ctx = StageContext {
            shape: &mut shape,
            settings: &settings,
            rng: &mut rng,
        };
        chain.update_all(particle, &mut ctx, 0.1).unwrap();

        // The pull point sits at the origin, so the radial term pulls along
        // -X and the tangential term (about +Y) pushes along -Z.
        assert!((particle.velocity.x - -0.1).abs() < 1e-5);
        assert!(particle.velocity.y.abs() < 1e-5);
        assert!((particle.velocity.z - -0.1).abs() < 1e-5);
    }

    #[test]
    fn random_direction_stores_a_signed_tangent_force() {
        let mut radial = orbiter();
        radial.set_random_direction(true);
        radial.set_tangent_force(2.5);
        let mut chain = InfluencerChain::new();
        chain.add(Box::new(radial));
        let slot = FloatSlot::test_slot(0);

        let mut pool = ParticlePool::with_capacity(16, chain.layout());
        let mut shape = EmitterShapeSampler::new();
        shape.init(1.0);
        let settings = EmitterSettings::default();
        let mut rng = SmallRng::seed_from_u64(11);

        let mut seen = Vec::new();
        for _ in 0..16 {
            let index = pool.acquire().unwrap();
            let particle = pool.get_mut(index).unwrap();
            let mut ctx = StageContext {
                shape: &mut shape,
                settings: &settings,
                rng: &mut rng,
            };
            chain.initialize_all(particle, &mut ctx);
            let force = particle.float_data(slot);
            assert!(force == 2.5 || force == -2.5);
            seen.push(force);
        }
        // With sixteen draws both directions should appear.
        assert!(seen.iter().any(|f| *f > 0.0));
        assert!(seen.iter().any(|f| *f < 0.0));
    }

    #[test]
    fn emission_point_alignment_rederives_the_stored_face() {
        let mut chain = InfluencerChain::new();
        chain.add(Box::new(RadialVelocityInfluencer::new()));
        let mut pool = ParticlePool::with_capacity(1, chain.layout());

        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        let mut shape = EmitterShapeSampler::new();
        shape.init_from_mesh(&positions, &indices).unwrap();

        let settings = EmitterSettings::default();
        let mut rng = SmallRng::seed_from_u64(5);

        let index = pool.acquire().unwrap();
        let particle = pool.get_mut(index).unwrap();
        particle.triangle_index = 1;
        particle.position = Vec3::new(0.2, 0.5, 0.2);
        particle.initial_speed = 1.0;

        let mut ctx = StageContext {
            shape: &mut shape,
            settings: &settings,
            rng: &mut rng,
        };
        chain.initialize_all(particle, &mut ctx);
        let mut ctx = StageContext {
            shape: &mut shape,
            settings: &settings,
            rng: &mut rng,
        };
        chain.update_all(particle, &mut ctx, 0.016).unwrap();

        assert_eq!(shape.triangle_index(), 1);
    }
}
