//! # Ember Core
//!
//! Shared math and color primitives for the Ember particle toolkit.
//!
//! Everything here is plain data: small `Copy` types with the handful of
//! operations the simulation crates actually need. No GPU types, no
//! transforms — world-space composition belongs to the embedding scene.

pub mod color;
pub mod math;

pub use color::Color;
pub use math::Vec3;
