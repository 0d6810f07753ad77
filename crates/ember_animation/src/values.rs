//! Interpolatable value types
//!
//! One trait for everything a keyframe track can drive: scalars, vectors
//! and colors all blend the same way.

use ember_core::{Color, Vec3};

/// Trait for values that can be linearly interpolated
///
/// `t` is deliberately not clamped: overshooting easing curves produce blend
/// factors slightly outside [0, 1] and the interpolation must follow them.
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_lerp() {
        assert!((2.0f32.lerp(&6.0, 0.25) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn vector_lerp_overshoots_with_t_above_one() {
        let v = Interpolate::lerp(&Vec3::ZERO, &Vec3::UNIT_Y, 1.2);
        assert!((v.y - 1.2).abs() < 1e-6);
    }
}
