//! # Ember Animation
//!
//! Easing curves and keyframed value tracks.
//!
//! # Features
//!
//! - **Easing catalogue**: named progress-remapping curves, including
//!   overshooting back/elastic variants
//! - **Typed interpolation**: one `Interpolate` trait for scalars, vectors
//!   and colors
//! - **Keyframe tracks**: shared, immutable track configuration with
//!   per-consumer playback state, cycling or clamped termination, and
//!   fixed or lifespan-derived segment durations

pub mod easing;
pub mod error;
pub mod track;
pub mod values;

pub use easing::Easing;
pub use error::{Result, TrackError};
pub use track::{KeyframeTrack, TrackPlayback};
pub use values::Interpolate;
