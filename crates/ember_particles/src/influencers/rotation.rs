//! Rotation influencer
//!
//! Drives per-axis rotation speed from a keyframed [`KeyframeTrack`] and
//! integrates it into the particle's angles. Randomization happens once per
//! activation: spin direction flags are drawn at initialize and held for the
//! particle's whole life, while speed scaling re-rolls on every segment so
//! two particles sharing the track still move independently.

use crate::error::Result;
use crate::influencers::{
    Influencer, InfluencerConfig, InfluencerSnapshot, StageContext, TrackSnapshot,
};
use crate::particle::Particle;
use crate::pool::{ObjectSlot, SlotRegistry};
use ember_animation::{Easing, KeyframeTrack, TrackPlayback};
use ember_core::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

/// Per-particle rotation state, held in an object extension slot
#[derive(Clone, Debug)]
struct RotationState {
    playback: Option<TrackPlayback<Vec3>>,
    dir_x: bool,
    dir_y: bool,
    dir_z: bool,
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            playback: None,
            dir_x: true,
            dir_y: true,
            dir_z: true,
        }
    }
}

/// Keyframed per-axis rotation
#[derive(Clone)]
pub struct RotationInfluencer {
    speeds: KeyframeTrack<Vec3>,
    random_direction: bool,
    random_speed: bool,
    random_start_x: bool,
    random_start_y: bool,
    random_start_z: bool,
    enabled: bool,
    state_slot: Option<ObjectSlot>,
}

impl Default for RotationInfluencer {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationInfluencer {
    pub fn new() -> Self {
        Self {
            speeds: KeyframeTrack::new(),
            random_direction: true,
            random_speed: true,
            random_start_x: false,
            random_start_y: false,
            random_start_z: false,
            enabled: true,
            state_slot: None,
        }
    }

    /// Append a rotation speed keyframe with linear easing
    pub fn add_speed(&mut self, speed: Vec3) {
        self.add_speed_with(speed, Easing::Linear);
    }

    /// Append a rotation speed keyframe
    pub fn add_speed_with(&mut self, speed: Vec3, easing: Easing) {
        self.speeds.add_key(speed, easing);
    }

    /// Remove the speed keyframe at `index`
    pub fn remove_speed(&mut self, index: usize) -> Result<()> {
        self.speeds.remove_key(index)?;
        Ok(())
    }

    pub fn speeds(&self) -> &KeyframeTrack<Vec3> {
        &self.speeds
    }

    /// Replace the whole speed track
    pub fn set_track(&mut self, track: KeyframeTrack<Vec3>) {
        self.speeds = track;
    }

    /// Cycle the track with a fixed per-segment duration (zero reverts to
    /// lifespan-derived clamped playback)
    pub fn set_fixed_duration(&mut self, duration: f32) {
        self.speeds.set_fixed_duration(duration);
    }

    /// Choose a random spin direction per axis at each activation
    pub fn set_random_direction(&mut self, random_direction: bool) {
        self.random_direction = random_direction;
    }

    pub fn random_direction(&self) -> bool {
        self.random_direction
    }

    /// Scale each sampled keyframe speed by a fresh random factor in [0, 1)
    pub fn set_random_speed(&mut self, random_speed: bool) {
        self.random_speed = random_speed;
    }

    pub fn random_speed(&self) -> bool {
        self.random_speed
    }

    /// Start each activation at a random angle on the chosen axes
    pub fn set_random_start_rotation(&mut self, x: bool, y: bool, z: bool) {
        self.random_start_x = x;
        self.random_start_y = y;
        self.random_start_z = z;
    }
}

fn sample_speed(
    speed: &Vec3,
    rng: &mut SmallRng,
    random_speed: bool,
    random_direction: bool,
    dirs: (bool, bool, bool),
) -> Vec3 {
    let mut value = *speed;
    if random_speed {
        value = Vec3::new(
            rng.gen::<f32>() * value.x,
            rng.gen::<f32>() * value.y,
            rng.gen::<f32>() * value.z,
        );
    }
    if random_direction {
        if !dirs.0 {
            value.x = -value.x;
        }
        if !dirs.1 {
            value.y = -value.y;
        }
        if !dirs.2 {
            value.z = -value.z;
        }
    }
    value
}

impl Influencer for RotationInfluencer {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.state_slot = Some(registry.register_object_slot());
    }

    fn first_initialize(&mut self, _particle: &mut Particle, _ctx: &mut StageContext<'_>) {
        if self.speeds.is_empty() {
            self.speeds.add_key(Vec3::new(0.0, 0.0, 10.0), Easing::Linear);
        }
    }

    fn initialize(&mut self, particle: &mut Particle, ctx: &mut StageContext<'_>) {
        let Some(slot) = self.state_slot else { return };

        let dirs = if self.random_direction {
            (ctx.rng.gen(), ctx.rng.gen(), ctx.rng.gen())
        } else {
            (true, true, true)
        };

        let playback = {
            let rng = &mut *ctx.rng;
            let random_speed = self.random_speed;
            let random_direction = self.random_direction;
            self.speeds.begin(particle.lifespan, |speed| {
                sample_speed(speed, rng, random_speed, random_direction, dirs)
            })
        };

        particle.init_object_data(slot, RotationState::default);
        if let Some(state) = particle.object_data_mut::<RotationState>(slot) {
            state.playback = playback;
            state.dir_x = dirs.0;
            state.dir_y = dirs.1;
            state.dir_z = dirs.2;
        }

        particle.angles = if self.random_start_x || self.random_start_y || self.random_start_z {
            let tau = std::f32::consts::TAU;
            Vec3::new(
                if self.random_start_x {
                    ctx.rng.gen::<f32>() * tau
                } else {
                    0.0
                },
                if self.random_start_y {
                    ctx.rng.gen::<f32>() * tau
                } else {
                    0.0
                },
                if self.random_start_z {
                    ctx.rng.gen::<f32>() * tau
                } else {
                    0.0
                },
            )
        } else {
            Vec3::ZERO
        };
    }

    fn update(
        &mut self,
        particle: &mut Particle,
        ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()> {
        let Some(slot) = self.state_slot else {
            return Ok(());
        };

        let speed = match particle.object_data_mut::<RotationState>(slot) {
            Some(state) => {
                let dirs = (state.dir_x, state.dir_y, state.dir_z);
                match state.playback.as_mut() {
                    Some(playback) => {
                        let rng = &mut *ctx.rng;
                        let random_speed = self.random_speed;
                        let random_direction = self.random_direction;
                        self.speeds.step(playback, dt, |s| {
                            sample_speed(s, rng, random_speed, random_direction, dirs)
                        });
                        playback.value
                    }
                    None => Vec3::ZERO,
                }
            }
            None => Vec3::ZERO,
        };

        particle.angles += speed * dt;
        Ok(())
    }

    fn reset(&mut self, particle: &mut Particle) {
        particle.angles = Vec3::ZERO;
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
            config: InfluencerConfig::Rotation {
                speeds: TrackSnapshot::capture(&self.speeds),
                random_direction: self.random_direction,
                random_speed: self.random_speed,
                random_start_x: self.random_start_x,
                random_start_y: self.random_start_y,
                random_start_z: self.random_start_z,
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
    use rand::SeedableRng;

    struct Rig {
        chain: InfluencerChain,
        pool: ParticlePool,
        shape: EmitterShapeSampler,
        settings: EmitterSettings,
        rng: SmallRng,
    }

    fn rig(rotation: RotationInfluencer) -> Rig {
        let mut chain = InfluencerChain::new();
        chain.add(Box::new(rotation));
        let pool = ParticlePool::with_capacity(2, chain.layout());
        let mut shape = EmitterShapeSampler::new();
        shape.init(1.0);
        Rig {
            chain,
            pool,
            shape,
            settings: EmitterSettings::default(),
            rng: SmallRng::seed_from_u64(42),
        }
    }

    fn deterministic() -> RotationInfluencer {
        let mut rotation = RotationInfluencer::new();
        rotation.set_random_direction(false);
        rotation.set_random_speed(false);
        rotation
    }

    #[test]
    fn first_use_seeds_a_default_speed_key() {
        let mut rig = rig(RotationInfluencer::new());
        let index = rig.pool.acquire().unwrap();
        let particle = rig.pool.get_mut(index).unwrap();
        particle.lifespan = 2.0;

        let mut ctx = StageContext {
            shape: &mut rig.shape,
            settings: &rig.settings,
            rng: &mut rig.rng,
        };
        rig.chain.initialize_all(particle, &mut ctx);

        let rotation = rig.chain.get(0).unwrap();
        match &rotation.snapshot().config {
            InfluencerConfig::Rotation { speeds, .. } => {
                assert_eq!(speeds.keys.len(), 1);
                assert_eq!(speeds.keys[0].value, Vec3::new(0.0, 0.0, 10.0));
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn constant_speed_integrates_into_angles() {
        let mut rotation = deterministic();
        rotation.add_speed(Vec3::new(0.0, 0.0, 2.0));
        let mut rig = rig(rotation);

        let index = rig.pool.acquire().unwrap();
        let particle = rig.pool.get_mut(index).unwrap();
        particle.lifespan = 10.0;

        let mut ctx = StageContext {
            shape: &mut rig.shape,
            settings: &rig.settings,
            rng: &mut rig.rng,
        };
        rig.chain.initialize_all(particle, &mut ctx);
        for _ in 0..4 {
            let mut ctx = StageContext {
                shape: &mut rig.shape,
                settings: &rig.settings,
                rng: &mut rig.rng,
            };
            rig.chain.update_all(particle, &mut ctx, 0.5).unwrap();
        }
        assert!((particle.angles.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn keyframed_speed_blends_between_keys() {
        let mut rotation = deterministic();
        rotation.add_speed(Vec3::new(0.0, 0.0, 0.0));
        rotation.add_speed(Vec3::new(0.0, 0.0, 8.0));
        let mut rig = rig(rotation);

        let index = rig.pool.acquire().unwrap();
        let particle = rig.pool.get_mut(index).unwrap();
        particle.lifespan = 2.0;

        let mut ctx = StageContext {
            shape: &mut rig.shape,
            settings: &rig.settings,
            rng: &mut rig.rng,
        };
        rig.chain.initialize_all(particle, &mut ctx);
        // One segment of duration 2.0 (lifespan / (2 - 1)); halfway through,
        // the interpolated speed is 4.0 rad/s.
        let mut ctx = StageContext {
            shape: &mut rig.shape,
            settings: &rig.settings,
            rng: &mut rig.rng,
        };
        rig.chain.update_all(particle, &mut ctx, 1.0).unwrap();
        assert!((particle.angles.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn reset_restores_neutral_angles_and_reinit_matches_first_use() {
        let mut rotation = deterministic();
        rotation.add_speed(Vec3::new(1.0, 2.0, 3.0));
        let mut rig = rig(rotation);

        let fresh_index = rig.pool.acquire().unwrap();
        let worked_index = rig.pool.acquire().unwrap();

        // Fresh record: single initialize.
        {
            let particle = rig.pool.get_mut(fresh_index).unwrap();
            particle.lifespan = 4.0;
            let mut ctx = StageContext {
                shape: &mut rig.shape,
                settings: &rig.settings,
                rng: &mut rig.rng,
            };
            rig.chain.initialize_all(particle, &mut ctx);
        }
        let fresh_angles = rig.pool.get(fresh_index).unwrap().angles;

        // Worked record: full lifecycle, then reactivation.
        {
            let particle = rig.pool.get_mut(worked_index).unwrap();
            particle.lifespan = 4.0;
            let mut ctx = StageContext {
                shape: &mut rig.shape,
                settings: &rig.settings,
                rng: &mut rig.rng,
            };
            rig.chain.initialize_all(particle, &mut ctx);
            for _ in 0..8 {
                let mut ctx = StageContext {
                    shape: &mut rig.shape,
                    settings: &rig.settings,
                    rng: &mut rig.rng,
                };
                rig.chain.update_all(particle, &mut ctx, 0.25).unwrap();
            }
            rig.chain.reset_all(particle);
            assert_eq!(particle.angles, Vec3::ZERO);

            let mut ctx = StageContext {
                shape: &mut rig.shape,
                settings: &rig.settings,
                rng: &mut rig.rng,
            };
            rig.chain.initialize_all(particle, &mut ctx);
        }

        let worked = rig.pool.get(worked_index).unwrap();
        assert_eq!(worked.angles, fresh_angles);
    }
}
