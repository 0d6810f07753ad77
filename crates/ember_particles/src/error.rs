//! Error types for ember_particles

use ember_animation::TrackError;
use thiserror::Error;

/// Errors surfaced by the particle kernel
#[derive(Error, Debug)]
pub enum EffectError {
    /// A spawn was requested with no free pool slot. Not fatal: the spawn is
    /// a no-op and the caller decides whether to care.
    #[error("particle pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// The emission shape was sampled before `init` supplied geometry
    #[error("emission shape sampled before init")]
    ShapeNotInitialized,

    /// The supplied mesh data does not describe a triangulated surface
    #[error("emission mesh is not a triangulated surface")]
    InvalidShapeMesh,

    /// A face index outside the current shape, e.g. one retained across a
    /// re-init
    #[error("triangle index {index} out of range ({count} faces)")]
    InvalidTriangleIndex { index: usize, count: usize },

    /// Keyframe track misconfiguration
    #[error(transparent)]
    Track(#[from] TrackError),

    /// A persisted configuration named an easing the resolver does not know
    #[error("unknown easing identifier '{name}'")]
    UnknownEasing { name: String },

    /// An influencer stage failed mid-update; remaining stages for that
    /// particle were left un-run for the frame
    #[error("influencer '{name}' failed: {message}")]
    Stage { name: String, message: String },
}

/// Result type for ember_particles operations
pub type Result<T> = std::result::Result<T, EffectError>;
