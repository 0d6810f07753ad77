//! Particle influencers
//!
//! An influencer is one stage of per-particle behavior with a fixed
//! lifecycle: `first_initialize` (once per influencer instance, lazily, right
//! before its first `initialize`), `initialize` (every activation), `update`
//! (every live frame) and `reset` (exactly once at death). Stages run in
//! registration order for every pass, so later stages may read what earlier
//! stages wrote in the same pass.
//!
//! Influencers are capability objects, not a class hierarchy: anything
//! keyframed composes a [`KeyframeTrack`](ember_animation::KeyframeTrack)
//! instead of inheriting an interpolating base.

mod alpha;
mod radial_velocity;
mod rotation;
mod snapshot;
mod sprite;

pub use alpha::AlphaInfluencer;
pub use radial_velocity::{
    RadialPullAlignment, RadialPullCenter, RadialUpAlignment, RadialVelocityInfluencer,
};
pub use rotation::RotationInfluencer;
pub use snapshot::{restore_influencer, InfluencerConfig, InfluencerSnapshot, TrackKey, TrackSnapshot};
pub use sprite::SpriteInfluencer;

use crate::emitter::EmitterSettings;
use crate::error::Result;
use crate::particle::Particle;
use crate::pool::{SlotLayout, SlotRegistry};
use crate::shape::EmitterShapeSampler;
use rand::rngs::SmallRng;

/// Emitter state lent to a stage for the duration of one lifecycle call
pub struct StageContext<'a> {
    /// The emitter's emission shape sampler
    pub shape: &'a mut EmitterShapeSampler,
    /// The emitter's configuration
    pub settings: &'a EmitterSettings,
    /// The emitter's random generator
    pub rng: &'a mut SmallRng,
}

/// One pluggable per-particle behavior stage
pub trait Influencer {
    /// Display name, also used as the snapshot discriminator
    fn name(&self) -> &'static str;

    /// Claim extension slots from the chain's registry. Called once, when
    /// the influencer is added to a chain — never during simulation.
    fn register_slots(&mut self, _registry: &mut SlotRegistry) {}

    /// One-time lazy setup, invoked immediately before this instance's first
    /// `initialize` (e.g. seeding a default keyframe when none is configured)
    fn first_initialize(&mut self, _particle: &mut Particle, _ctx: &mut StageContext<'_>) {}

    /// Called on every (re)activation of a pool slot; must leave every field
    /// and slot this influencer owns at a valid starting value
    fn initialize(&mut self, particle: &mut Particle, ctx: &mut StageContext<'_>);

    /// Called once per live particle per frame. Errors are not swallowed:
    /// the chain propagates the first failure and skips the remaining stages
    /// for that particle this frame.
    fn update(
        &mut self,
        particle: &mut Particle,
        ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()>;

    /// Called exactly once when the particle dies; must restore everything
    /// this influencer mutated to neutral so the slot is clean for the next
    /// spawn. Runs even while the influencer is disabled.
    fn reset(&mut self, particle: &mut Particle);

    fn enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Deep-copy configuration for template instantiation. Per-particle slot
    /// contents are never copied — they live in the particles.
    fn duplicate(&self) -> Box<dyn Influencer>;

    /// Pure-data configuration snapshot for the persistence collaborator
    fn snapshot(&self) -> InfluencerSnapshot;
}

struct Stage {
    influencer: Box<dyn Influencer>,
    first_done: bool,
}

/// Ordered influencer pipeline
///
/// The chain owns the slot registry: adding an influencer lets it claim its
/// extension slots, and the resulting [`SlotLayout`] sizes any pool built
/// for this chain. Order is caller-significant and preserved exactly.
#[derive(Default)]
pub struct InfluencerChain {
    registry: SlotRegistry,
    stages: Vec<Stage>,
}

impl InfluencerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an influencer, letting it claim extension slots
    pub fn add(&mut self, mut influencer: Box<dyn Influencer>) {
        influencer.register_slots(&mut self.registry);
        self.stages.push(Stage {
            influencer,
            first_done: false,
        });
    }

    /// Builder-style [`Self::add`]
    pub fn with(mut self, influencer: Box<dyn Influencer>) -> Self {
        self.add(influencer);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Slot-array width required by the influencers registered so far
    pub fn layout(&self) -> SlotLayout {
        self.registry.layout()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Influencer> {
        self.stages.get(index).map(|s| s.influencer.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn Influencer + 'static)> {
        self.stages.get_mut(index).map(|s| s.influencer.as_mut())
    }

    /// Run the initialize pass in registration order, triggering each
    /// influencer's one-time `first_initialize` as needed. Disabled
    /// influencers are skipped entirely (their first-initialize stays
    /// pending until they are enabled).
    pub fn initialize_all(&mut self, particle: &mut Particle, ctx: &mut StageContext<'_>) {
        for stage in &mut self.stages {
            if !stage.influencer.enabled() {
                continue;
            }
            if !stage.first_done {
                stage.influencer.first_initialize(particle, ctx);
                stage.first_done = true;
            }
            stage.influencer.initialize(particle, ctx);
        }
    }

    /// Run the update pass in registration order, propagating the first
    /// stage failure and leaving later stages un-run for this particle
    pub fn update_all(
        &mut self,
        particle: &mut Particle,
        ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()> {
        for stage in &mut self.stages {
            if !stage.influencer.enabled() {
                continue;
            }
            stage.influencer.update(particle, ctx, dt)?;
        }
        Ok(())
    }

    /// Run the reset pass in registration order. Never skips a stage:
    /// cleanup is unconditional so a disabled influencer cannot leak stale
    /// per-particle state into a future spawn.
    pub fn reset_all(&mut self, particle: &mut Particle) {
        for stage in &mut self.stages {
            stage.influencer.reset(particle);
        }
    }

    /// Deep-copy the chain for an independent emitter instance: influencer
    /// configuration and slot layout are cloned, first-initialize tracking
    /// starts over, and no per-particle state comes along
    pub fn duplicate(&self) -> InfluencerChain {
        InfluencerChain {
            registry: self.registry.clone(),
            stages: self
                .stages
                .iter()
                .map(|s| Stage {
                    influencer: s.influencer.duplicate(),
                    first_done: false,
                })
                .collect(),
        }
    }

    /// Pure-data snapshots of every influencer, in pipeline order
    pub fn snapshots(&self) -> Vec<InfluencerSnapshot> {
        self.stages.iter().map(|s| s.influencer.snapshot()).collect()
    }
}
