//! Pure-data influencer configuration snapshots
//!
//! The kernel does not own persistence framing: it exposes influencer
//! configuration as plain serializable data and accepts it back. Easing
//! functions travel as string identifiers and are resolved on restore,
//! by default through [`Easing::from_name`] or through any external
//! resolver with the same shape.

use crate::error::{EffectError, Result};
use crate::influencers::{
    AlphaInfluencer, Influencer, RadialPullAlignment, RadialPullCenter, RadialUpAlignment,
    RadialVelocityInfluencer, RotationInfluencer, SpriteInfluencer,
};
use ember_animation::{Easing, Interpolate, KeyframeTrack};
use ember_core::Vec3;
use serde::{Deserialize, Serialize};

/// One keyframe: a control value and its easing identifier
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackKey<T> {
    pub value: T,
    pub easing: String,
}

/// Serializable form of a [`KeyframeTrack`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackSnapshot<T> {
    pub keys: Vec<TrackKey<T>>,
    pub cycle: bool,
    pub fixed_duration: f32,
}

impl<T> Default for TrackSnapshot<T> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            cycle: false,
            fixed_duration: 0.0,
        }
    }
}

impl<T: Interpolate> TrackSnapshot<T> {
    pub fn capture(track: &KeyframeTrack<T>) -> Self {
        Self {
            keys: track
                .keys()
                .iter()
                .zip(track.easings())
                .map(|(value, easing)| TrackKey {
                    value: value.clone(),
                    easing: easing.name().to_string(),
                })
                .collect(),
            cycle: track.cycle(),
            fixed_duration: track.fixed_duration(),
        }
    }

    /// Rebuild the track, resolving easing identifiers through the built-in
    /// catalogue
    pub fn restore(&self) -> Result<KeyframeTrack<T>> {
        self.restore_with(Easing::from_name)
    }

    /// Rebuild the track with a caller-supplied easing resolver
    pub fn restore_with(
        &self,
        resolver: impl Fn(&str) -> Option<Easing>,
    ) -> Result<KeyframeTrack<T>> {
        let mut track = KeyframeTrack::new();
        for key in &self.keys {
            let easing = resolver(&key.easing).ok_or_else(|| EffectError::UnknownEasing {
                name: key.easing.clone(),
            })?;
            track.add_key(key.value.clone(), easing);
        }
        track.set_fixed_duration(if self.cycle { self.fixed_duration } else { 0.0 });
        Ok(track)
    }
}

/// Kind-specific influencer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InfluencerConfig {
    Rotation {
        speeds: TrackSnapshot<Vec3>,
        random_direction: bool,
        random_speed: bool,
        random_start_x: bool,
        random_start_y: bool,
        random_start_z: bool,
    },
    RadialVelocity {
        radial_pull: f32,
        tangent_force: f32,
        pull_alignment: RadialPullAlignment,
        pull_center: RadialPullCenter,
        up_alignment: RadialUpAlignment,
        random_direction: bool,
    },
    Sprite {
        animate: bool,
        random_start_frame: bool,
        frame_sequence: Option<Vec<u32>>,
        cycle: bool,
        fixed_duration: f32,
    },
    Alpha {
        alphas: TrackSnapshot<f32>,
    },
}

/// Complete snapshot of one influencer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InfluencerSnapshot {
    pub name: String,
    pub enabled: bool,
    pub config: InfluencerConfig,
}

/// Rebuild an influencer from its snapshot
pub fn restore_influencer(snapshot: &InfluencerSnapshot) -> Result<Box<dyn Influencer>> {
    let mut influencer: Box<dyn Influencer> = match &snapshot.config {
        InfluencerConfig::Rotation {
            speeds,
            random_direction,
            random_speed,
            random_start_x,
            random_start_y,
            random_start_z,
        } => {
            let mut rotation = RotationInfluencer::new();
            rotation.set_track(speeds.restore()?);
            rotation.set_random_direction(*random_direction);
            rotation.set_random_speed(*random_speed);
            rotation.set_random_start_rotation(*random_start_x, *random_start_y, *random_start_z);
            Box::new(rotation)
        }
        InfluencerConfig::RadialVelocity {
            radial_pull,
            tangent_force,
            pull_alignment,
            pull_center,
            up_alignment,
            random_direction,
        } => {
            let mut radial = RadialVelocityInfluencer::new();
            radial.set_radial_pull(*radial_pull);
            radial.set_tangent_force(*tangent_force);
            radial.set_pull_alignment(*pull_alignment);
            radial.set_pull_center(*pull_center);
            radial.set_up_alignment(*up_alignment);
            radial.set_random_direction(*random_direction);
            Box::new(radial)
        }
        InfluencerConfig::Sprite {
            animate,
            random_start_frame,
            frame_sequence,
            cycle,
            fixed_duration,
        } => {
            let mut sprite = SpriteInfluencer::new();
            sprite.set_animate(*animate);
            sprite.set_random_start_frame(*random_start_frame);
            sprite.set_frame_sequence(frame_sequence.clone());
            if *cycle {
                sprite.set_fixed_duration(*fixed_duration);
            }
            Box::new(sprite)
        }
        InfluencerConfig::Alpha { alphas } => {
            let mut alpha = AlphaInfluencer::new();
            alpha.set_track(alphas.restore()?);
            Box::new(alpha)
        }
    };
    influencer.set_enabled(snapshot.enabled);
    Ok(influencer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_snapshot_round_trips() {
        let mut track = KeyframeTrack::new()
            .with_key(1.0f32, Easing::Linear)
            .with_key(0.0, Easing::BackOut);
        track.set_fixed_duration(0.25);

        let snapshot = TrackSnapshot::capture(&track);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: TrackSnapshot<f32> = serde_json::from_str(&json).unwrap();
        let restored = parsed.restore().unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.easing(1).unwrap(), Easing::BackOut);
        assert!(restored.cycle());
        assert!((restored.fixed_duration() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn unknown_easing_identifiers_are_reported() {
        let snapshot = TrackSnapshot::<f32> {
            keys: vec![TrackKey {
                value: 1.0,
                easing: "wobbly".into(),
            }],
            cycle: false,
            fixed_duration: 0.0,
        };
        assert!(matches!(
            snapshot.restore(),
            Err(EffectError::UnknownEasing { .. })
        ));
    }

    #[test]
    fn influencer_snapshot_round_trips_through_json() {
        let mut rotation = RotationInfluencer::new();
        rotation.add_speed_with(Vec3::new(0.0, 0.0, 4.0), Easing::QuadOut);
        rotation.set_random_speed(false);
        rotation.set_enabled(false);

        let snapshot = rotation.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: InfluencerSnapshot = serde_json::from_str(&json).unwrap();
        let restored = restore_influencer(&parsed).unwrap();

        assert_eq!(restored.name(), "rotation");
        assert!(!restored.enabled());
        // The restored influencer snapshots back to the identical document.
        let rejson = serde_json::to_string(&restored.snapshot()).unwrap();
        assert_eq!(rejson, json);
    }
}
