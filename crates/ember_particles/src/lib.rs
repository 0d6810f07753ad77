//! # Ember Particles
//!
//! A CPU particle simulation kernel for short-lived visual effects (fire,
//! smoke, trails): a fixed-capacity particle pool, an ordered chain of
//! pluggable per-particle behavior stages ("influencers"), keyframed
//! attribute animation, and a triangle-mesh emission shape supplying
//! stochastic spawn geometry.
//!
//! The kernel owns simulation only. Rendering, GPU buffers, scene-graph
//! transforms and persistence framing belong to the embedding application;
//! the kernel exposes per-particle state and pure-data configuration
//! snapshots at those boundaries.
//!
//! # Example
//!
//! ```rust
//! use ember_particles::prelude::*;
//!
//! let mut chain = InfluencerChain::new();
//! chain.add(Box::new(RotationInfluencer::new()));
//!
//! let mut shape = EmitterShapeSampler::new();
//! shape.init(1.0);
//!
//! let settings = EmitterSettings {
//!     life_min: 0.5,
//!     life_max: 2.0,
//!     ..EmitterSettings::default()
//! };
//! let mut emitter = Emitter::new(256, settings, chain, shape);
//!
//! emitter.emit().unwrap();
//! emitter.update(1.0 / 60.0).unwrap();
//! ```

pub mod emitter;
pub mod error;
pub mod influencers;
pub mod particle;
pub mod pool;
pub mod shape;

pub use emitter::{EmissionPoint, Emitter, EmitterSettings, EmitterSnapshot};
pub use error::{EffectError, Result};
pub use influencers::{Influencer, InfluencerChain, StageContext};
pub use particle::{Particle, ParticleInstance};
pub use pool::{FloatSlot, ObjectSlot, ParticlePool, SlotLayout, SlotRegistry};
pub use shape::{EmitterShapeSampler, TriangleShape};

/// Common imports
pub mod prelude {
    pub use crate::emitter::{EmissionPoint, Emitter, EmitterSettings};
    pub use crate::error::{EffectError, Result};
    pub use crate::influencers::{
        AlphaInfluencer, Influencer, InfluencerChain, RadialVelocityInfluencer,
        RotationInfluencer, SpriteInfluencer, StageContext,
    };
    pub use crate::particle::{Particle, ParticleInstance};
    pub use crate::pool::{ParticlePool, SlotRegistry};
    pub use crate::shape::{EmitterShapeSampler, TriangleShape};
    pub use ember_animation::{Easing, KeyframeTrack};
    pub use ember_core::{Color, Vec3};
}
