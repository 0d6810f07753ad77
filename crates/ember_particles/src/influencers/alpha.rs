//! Alpha influencer
//!
//! Keyframed scalar track over the particle's alpha. Structurally the same
//! shape as the rotation influencer, instantiated at `f32`: the track engine
//! is type-generic and this stage exercises the scalar side of it.

use crate::error::Result;
use crate::influencers::{
    Influencer, InfluencerConfig, InfluencerSnapshot, StageContext, TrackSnapshot,
};
use crate::particle::Particle;
use crate::pool::{ObjectSlot, SlotRegistry};
use ember_animation::{Easing, KeyframeTrack, TrackPlayback};

#[derive(Clone, Debug, Default)]
struct AlphaState {
    playback: Option<TrackPlayback<f32>>,
}

/// Keyframed alpha over a particle's life
#[derive(Clone)]
pub struct AlphaInfluencer {
    alphas: KeyframeTrack<f32>,
    enabled: bool,
    state_slot: Option<ObjectSlot>,
}

impl Default for AlphaInfluencer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaInfluencer {
    pub fn new() -> Self {
        Self {
            alphas: KeyframeTrack::new(),
            enabled: true,
            state_slot: None,
        }
    }

    /// Append an alpha keyframe with linear easing
    pub fn add_alpha(&mut self, alpha: f32) {
        self.add_alpha_with(alpha, Easing::Linear);
    }

    /// Append an alpha keyframe
    pub fn add_alpha_with(&mut self, alpha: f32, easing: Easing) {
        self.alphas.add_key(alpha, easing);
    }

    pub fn alphas(&self) -> &KeyframeTrack<f32> {
        &self.alphas
    }

    /// Replace the whole alpha track
    pub fn set_track(&mut self, track: KeyframeTrack<f32>) {
        self.alphas = track;
    }

    /// Cycle the track with a fixed per-segment duration (zero reverts to
    /// lifespan-derived clamped playback)
    pub fn set_fixed_duration(&mut self, duration: f32) {
        self.alphas.set_fixed_duration(duration);
    }
}

impl Influencer for AlphaInfluencer {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.state_slot = Some(registry.register_object_slot());
    }

    fn first_initialize(&mut self, _particle: &mut Particle, _ctx: &mut StageContext<'_>) {
        // Default to a full fade-out when nothing is configured.
        if self.alphas.is_empty() {
            self.alphas.add_key(1.0, Easing::Linear);
            self.alphas.add_key(0.0, Easing::Linear);
        }
    }

    fn initialize(&mut self, particle: &mut Particle, _ctx: &mut StageContext<'_>) {
        let Some(slot) = self.state_slot else { return };
        let playback = self.alphas.begin(particle.lifespan, |v| *v);
        particle.alpha = playback.as_ref().map(|p| p.value).unwrap_or(1.0);
        particle.init_object_data(slot, AlphaState::default);
        if let Some(state) = particle.object_data_mut::<AlphaState>(slot) {
            state.playback = playback;
        }
    }

    fn update(
        &mut self,
        particle: &mut Particle,
        _ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()> {
        let Some(slot) = self.state_slot else {
            return Ok(());
        };
        let value = match particle.object_data_mut::<AlphaState>(slot) {
            Some(state) => match state.playback.as_mut() {
                Some(playback) => {
                    self.alphas.step(playback, dt, |v| *v);
                    Some(playback.value)
                }
                None => None,
            },
            None => None,
        };
        if let Some(value) = value {
            particle.alpha = value;
        }
        Ok(())
    }

    fn reset(&mut self, particle: &mut Particle) {
        particle.alpha = 1.0;
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
            config: InfluencerConfig::Alpha {
                alphas: TrackSnapshot::capture(&self.alphas),
            },
        }
    }
}
