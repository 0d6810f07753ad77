//! Easing functions
//!
//! Pure remappings of normalized progress to a blend factor. Most curves map
//! [0, 1] onto [0, 1]; the back and elastic families intentionally overshoot.
//! Each curve has a stable string identifier so persisted configurations can
//! name easings without carrying code.

use serde::{Deserialize, Serialize};

const BACK_SCALE: f32 = 1.70158;
const TAU: f32 = std::f32::consts::TAU;

/// A named progress-remapping curve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Hermite smoothstep
    SmoothStep,
    SineIn,
    SineOut,
    SineInOut,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    ExpIn,
    ExpOut,
    CircIn,
    CircOut,
    /// Overshoots below 0 on the way in
    BackIn,
    /// Overshoots above 1 on the way out
    BackOut,
    BackInOut,
    ElasticIn,
    ElasticOut,
    BounceIn,
    BounceOut,
}

impl Easing {
    /// Remap normalized progress to a blend factor.
    ///
    /// The input is expected in [0, 1]. The output is in [0, 1] for every
    /// curve except the back and elastic families, which may overshoot.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::SineIn => 1.0 - ((t * std::f32::consts::FRAC_PI_2).cos()),
            Easing::SineOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Easing::SineInOut => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::ExpIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    (2.0f32).powf(10.0 * t - 10.0)
                }
            }
            Easing::ExpOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (2.0f32).powf(-10.0 * t)
                }
            }
            Easing::CircIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::CircOut => {
                let u = t - 1.0;
                (1.0 - u * u).max(0.0).sqrt()
            }
            Easing::BackIn => t * t * ((BACK_SCALE + 1.0) * t - BACK_SCALE),
            Easing::BackOut => {
                let u = t - 1.0;
                u * u * ((BACK_SCALE + 1.0) * u + BACK_SCALE) + 1.0
            }
            Easing::BackInOut => {
                let s = BACK_SCALE * 1.525;
                if t < 0.5 {
                    let u = 2.0 * t;
                    0.5 * (u * u * ((s + 1.0) * u - s))
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * (u * u * ((s + 1.0) * u + s) + 2.0)
                }
            }
            Easing::ElasticIn => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    -(2.0f32).powf(10.0 * t - 10.0) * ((t * 10.0 - 10.75) * TAU / 3.0).sin()
                }
            }
            Easing::ElasticOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    (2.0f32).powf(-10.0 * t) * ((t * 10.0 - 0.75) * TAU / 3.0).sin() + 1.0
                }
            }
            Easing::BounceIn => 1.0 - Easing::BounceOut.apply(1.0 - t),
            Easing::BounceOut => bounce_out(t),
        }
    }

    /// Stable identifier used by persisted configurations
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::SmoothStep => "smooth-step",
            Easing::SineIn => "sine-in",
            Easing::SineOut => "sine-out",
            Easing::SineInOut => "sine-in-out",
            Easing::QuadIn => "quad-in",
            Easing::QuadOut => "quad-out",
            Easing::QuadInOut => "quad-in-out",
            Easing::CubicIn => "cubic-in",
            Easing::CubicOut => "cubic-out",
            Easing::CubicInOut => "cubic-in-out",
            Easing::ExpIn => "exp-in",
            Easing::ExpOut => "exp-out",
            Easing::CircIn => "circ-in",
            Easing::CircOut => "circ-out",
            Easing::BackIn => "back-in",
            Easing::BackOut => "back-out",
            Easing::BackInOut => "back-in-out",
            Easing::ElasticIn => "elastic-in",
            Easing::ElasticOut => "elastic-out",
            Easing::BounceIn => "bounce-in",
            Easing::BounceOut => "bounce-out",
        }
    }

    /// Resolve a persisted identifier back to a curve
    pub fn from_name(name: &str) -> Option<Easing> {
        Self::ALL.iter().copied().find(|e| e.name() == name)
    }

    /// Every curve in the catalogue
    pub const ALL: [Easing; 22] = [
        Easing::Linear,
        Easing::SmoothStep,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::ExpIn,
        Easing::ExpOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::BounceIn,
        Easing::BounceOut,
    ];
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let u = t - 1.5 / D;
        N * u * u + 0.75
    } else if t < 2.5 / D {
        let u = t - 2.25 / D;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / D;
        N * u * u + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_fixed_for_every_curve() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < 1e-4, "{} at 0", easing.name());
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 1e-4,
                "{} at 1",
                easing.name()
            );
        }
    }

    #[test]
    fn linear_is_identity() {
        assert!((Easing::Linear.apply(0.37) - 0.37).abs() < 1e-6);
    }

    #[test]
    fn quad_bends_the_expected_way() {
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
        assert!(Easing::QuadOut.apply(0.5) > 0.5);
    }

    #[test]
    fn back_in_overshoots_below_zero() {
        assert!(Easing::BackIn.apply(0.3) < 0.0);
    }

    #[test]
    fn back_out_overshoots_above_one() {
        assert!(Easing::BackOut.apply(0.7) > 1.0);
    }

    #[test]
    fn names_round_trip() {
        for easing in Easing::ALL {
            assert_eq!(Easing::from_name(easing.name()), Some(easing));
        }
        assert_eq!(Easing::from_name("no-such-curve"), None);
    }
}
