//! Error types for ember_animation

use thiserror::Error;

/// Errors raised by keyframe track configuration and queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// A keyframe or easing slot was addressed outside `[0, count)`
    #[error("keyframe index {index} out of range (track has {count} keyframes)")]
    InvalidKeyframeIndex { index: usize, count: usize },

    /// The track cannot derive a segment duration from its configuration
    #[error("degenerate track: {reason}")]
    DegenerateTrack { reason: &'static str },
}

/// Result type for ember_animation operations
pub type Result<T> = std::result::Result<T, TrackError>;
