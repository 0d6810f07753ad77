//! Keyframed value tracks
//!
//! A [`KeyframeTrack`] is shared, immutable-at-runtime configuration: an
//! ordered list of control values, each paired with the [`Easing`] used to
//! blend *from* it, plus a termination mode. Playback state lives in a
//! [`TrackPlayback`] owned by whoever consumes the track (one per particle),
//! so a single track can drive any number of independent playbacks.
//!
//! Termination modes:
//! - **clamped** (default): segment duration is derived from the consumer's
//!   lifespan (`lifespan / (keys − 1)`); the track stops advancing on the
//!   final segment and holds its end value.
//! - **cycling**: every segment uses the configured fixed duration and the
//!   segment index wraps past the last keyframe back to the first.

use crate::easing::Easing;
use crate::error::{Result, TrackError};
use crate::values::Interpolate;
use smallvec::SmallVec;

/// Shared keyframe configuration for one animated attribute
#[derive(Clone, Debug)]
pub struct KeyframeTrack<T: Interpolate> {
    keys: SmallVec<[T; 4]>,
    easings: SmallVec<[Easing; 4]>,
    cycle: bool,
    fixed_duration: f32,
}

impl<T: Interpolate> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Create an empty clamped track
    pub fn new() -> Self {
        Self {
            keys: SmallVec::new(),
            easings: SmallVec::new(),
            cycle: false,
            fixed_duration: 0.0,
        }
    }

    /// Append a keyframe with the easing used to blend away from it
    pub fn add_key(&mut self, value: T, easing: Easing) {
        self.keys.push(value);
        self.easings.push(easing);
    }

    /// Builder-style [`Self::add_key`]
    pub fn with_key(mut self, value: T, easing: Easing) -> Self {
        self.add_key(value, easing);
        self
    }

    /// Remove the keyframe and easing at `index`
    pub fn remove_key(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.keys.remove(index);
        self.easings.remove(index);
        Ok(())
    }

    /// Remove every keyframe
    pub fn clear(&mut self) {
        self.keys.clear();
        self.easings.clear();
    }

    pub fn key(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        Ok(&self.keys[index])
    }

    pub fn set_key(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.keys[index] = value;
        Ok(())
    }

    pub fn easing(&self, index: usize) -> Result<Easing> {
        self.check_index(index)?;
        Ok(self.easings[index])
    }

    pub fn set_easing(&mut self, index: usize, easing: Easing) -> Result<()> {
        self.check_index(index)?;
        self.easings[index] = easing;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[T] {
        &self.keys
    }

    pub fn easings(&self) -> &[Easing] {
        &self.easings
    }

    pub fn cycle(&self) -> bool {
        self.cycle
    }

    pub fn fixed_duration(&self) -> f32 {
        self.fixed_duration
    }

    /// Set the per-segment duration and switch to cycling mode.
    ///
    /// A duration of zero means "not cycling": the track reverts to clamped,
    /// lifespan-derived durations rather than advancing every frame.
    pub fn set_fixed_duration(&mut self, duration: f32) {
        if duration != 0.0 {
            self.cycle = true;
            self.fixed_duration = duration;
        } else {
            self.cycle = false;
            self.fixed_duration = 0.0;
        }
    }

    /// Configuration-time validation: a playable track needs at least two
    /// keyframes, and a cycling track a positive duration.
    pub fn validate(&self) -> Result<()> {
        if self.keys.len() < 2 {
            return Err(TrackError::DegenerateTrack {
                reason: "fewer than two keyframes",
            });
        }
        if self.cycle && self.fixed_duration <= 0.0 {
            return Err(TrackError::DegenerateTrack {
                reason: "cycling track with non-positive duration",
            });
        }
        Ok(())
    }

    /// Start playback for a consumer with the given lifespan.
    ///
    /// `sample` maps each control value to the consumer's private copy; pass
    /// `|v| v.clone()` when no per-consumer randomization applies. Returns
    /// `None` for an empty track.
    pub fn begin<F>(&self, lifespan: f32, mut sample: F) -> Option<TrackPlayback<T>>
    where
        F: FnMut(&T) -> T,
    {
        let first = self.keys.first()?;
        let start = sample(first);
        let end = if self.keys.len() > 1 {
            sample(&self.keys[1])
        } else {
            start.clone()
        };
        Some(TrackPlayback {
            index: 0,
            elapsed: 0.0,
            duration: self.segment_duration(lifespan),
            value: start.clone(),
            start,
            end,
            easing: self.easings[0],
        })
    }

    /// Advance playback by `dt` and recompute the current value.
    ///
    /// Single-key tracks are constants and never advance. Elapsed time past a
    /// segment boundary is carried into the next segment (subtracted, not
    /// zeroed), so one oversized `dt` resolves through as many wraps as it
    /// covers. In clamped mode the final segment stalls at its end value.
    pub fn step<F>(&self, playback: &mut TrackPlayback<T>, dt: f32, mut sample: F)
    where
        F: FnMut(&T) -> T,
    {
        let len = self.keys.len();
        if len <= 1 || playback.duration <= 0.0 {
            return;
        }
        playback.elapsed += dt;
        while playback.elapsed >= playback.duration {
            if !self.cycle && playback.index >= len - 2 {
                playback.elapsed = playback.duration;
                break;
            }
            self.advance(playback, &mut sample);
        }
        let blend = playback.easing.apply(playback.elapsed / playback.duration);
        playback.value = playback.start.lerp(&playback.end, blend);
    }

    fn advance<F>(&self, playback: &mut TrackPlayback<T>, sample: &mut F)
    where
        F: FnMut(&T) -> T,
    {
        let len = self.keys.len();
        playback.index += 1;
        if playback.index == len {
            playback.index = 0;
        }
        playback.start = sample(&self.keys[playback.index]);
        let next = if playback.index + 1 == len {
            0
        } else {
            playback.index + 1
        };
        playback.end = sample(&self.keys[next]);
        playback.easing = self.easings[playback.index];
        playback.elapsed -= playback.duration;
    }

    fn segment_duration(&self, lifespan: f32) -> f32 {
        if self.cycle {
            self.fixed_duration
        } else if self.keys.len() >= 2 {
            lifespan / (self.keys.len() - 1) as f32
        } else {
            0.0
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.keys.len() {
            return Err(TrackError::InvalidKeyframeIndex {
                index,
                count: self.keys.len(),
            });
        }
        Ok(())
    }
}

/// Per-consumer playback state for one [`KeyframeTrack`]
///
/// This is the mutable half of the split: the track is shared configuration,
/// one `TrackPlayback` belongs to each particle (stored in its extension
/// slots) and is rebuilt on every activation.
#[derive(Clone, Debug)]
pub struct TrackPlayback<T: Interpolate> {
    /// Current segment index
    pub index: usize,
    /// Time into the current segment
    pub elapsed: f32,
    /// Segment duration for this consumer
    pub duration: f32,
    /// Current interpolated value
    pub value: T,
    /// Control value at the start of the current segment
    pub start: T,
    /// Control value at the end of the current segment
    pub end: T,
    /// Easing blending this segment
    pub easing: Easing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clone_sample(v: &f32) -> f32 {
        *v
    }

    #[test]
    fn single_key_track_is_constant() {
        let track = KeyframeTrack::new().with_key(5.0f32, Easing::Linear);
        let mut playback = track.begin(3.0, clone_sample).unwrap();
        for _ in 0..10 {
            track.step(&mut playback, 0.7, clone_sample);
        }
        assert_eq!(playback.index, 0);
        assert!((playback.value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn empty_track_has_no_playback() {
        let track: KeyframeTrack<f32> = KeyframeTrack::new();
        assert!(track.begin(1.0, clone_sample).is_none());
    }

    #[test]
    fn value_matches_endpoints_with_linear_easing() {
        let mut track = KeyframeTrack::new()
            .with_key(0.0f32, Easing::Linear)
            .with_key(10.0, Easing::Linear);
        track.set_fixed_duration(2.0);

        let mut playback = track.begin(100.0, clone_sample).unwrap();
        assert!((playback.value - 0.0).abs() < 1e-6);

        track.step(&mut playback, 1.0, clone_sample);
        assert!((playback.value - 5.0).abs() < 1e-6);

        // Just before the boundary the value approaches the end control value.
        track.step(&mut playback, 0.999, clone_sample);
        assert!((playback.value - 9.995).abs() < 1e-3);
    }

    #[test]
    fn cycling_two_keys_plays_the_return_segment_then_wraps() {
        let mut track = KeyframeTrack::new()
            .with_key(0.0f32, Easing::Linear)
            .with_key(10.0, Easing::Linear);
        track.set_fixed_duration(2.0);

        let mut playback = track.begin(100.0, clone_sample).unwrap();
        track.step(&mut playback, 2.0, clone_sample);
        // One full segment: the index wraps into the return segment 1 -> 0.
        assert_eq!(playback.index, 1);
        assert!((playback.value - 10.0).abs() < 1e-6);

        track.step(&mut playback, 2.0, clone_sample);
        // Full cycle: back on segment 0 with the elapsed carried by
        // subtraction, not reset.
        assert_eq!(playback.index, 0);
        assert!((playback.value - 0.0).abs() < 1e-6);
    }

    #[test]
    fn oversized_dt_resolves_through_multiple_wraps() {
        let mut track = KeyframeTrack::new()
            .with_key(0.0f32, Easing::Linear)
            .with_key(10.0, Easing::Linear);
        track.set_fixed_duration(2.0);

        let mut playback = track.begin(100.0, clone_sample).unwrap();
        // 4.1 seconds covers both segments of the cycle plus 0.1s drift.
        track.step(&mut playback, 4.1, clone_sample);
        assert_eq!(playback.index, 0);
        assert!((playback.elapsed - 0.1).abs() < 1e-5);
        assert!((playback.value - 0.5).abs() < 1e-4);
    }

    #[test]
    fn cycling_three_keys_returns_to_first_segment() {
        let mut track = KeyframeTrack::new()
            .with_key(1.0f32, Easing::Linear)
            .with_key(2.0, Easing::Linear)
            .with_key(3.0, Easing::Linear);
        track.set_fixed_duration(1.0);

        let mut playback = track.begin(100.0, clone_sample).unwrap();
        for _ in 0..3 {
            track.step(&mut playback, 1.0, clone_sample);
        }
        assert_eq!(playback.index, 0);
    }

    #[test]
    fn clamped_track_stalls_on_final_segment_end_value() {
        // Three keys, lifespan 2.0: two segments of 1.0 each.
        let track = KeyframeTrack::new()
            .with_key(0.0f32, Easing::Linear)
            .with_key(4.0, Easing::Linear)
            .with_key(8.0, Easing::Linear);

        let mut playback = track.begin(2.0, clone_sample).unwrap();
        track.step(&mut playback, 1.0, clone_sample);
        assert_eq!(playback.index, 1);

        // Play far past the end of the particle's lifespan: the index stops
        // at the final segment and the value holds at its end control value.
        for _ in 0..5 {
            track.step(&mut playback, 1.0, clone_sample);
        }
        assert_eq!(playback.index, 1);
        assert!((playback.value - 8.0).abs() < 1e-6);
    }

    #[test]
    fn zero_fixed_duration_reverts_to_clamped_mode() {
        let mut track = KeyframeTrack::new()
            .with_key(0.0f32, Easing::Linear)
            .with_key(1.0, Easing::Linear);
        track.set_fixed_duration(0.5);
        assert!(track.cycle());
        track.set_fixed_duration(0.0);
        assert!(!track.cycle());
        // Duration now derives from the lifespan again.
        let playback = track.begin(3.0, clone_sample).unwrap();
        assert!((playback.duration - 3.0).abs() < 1e-6);
    }

    #[test]
    fn per_consumer_sampling_hook_applies() {
        let mut track = KeyframeTrack::new()
            .with_key(10.0f32, Easing::Linear)
            .with_key(20.0, Easing::Linear);
        track.set_fixed_duration(1.0);

        // A consumer that halves every control value it samples.
        let playback = track.begin(1.0, |v| v * 0.5).unwrap();
        assert!((playback.start - 5.0).abs() < 1e-6);
        assert!((playback.end - 10.0).abs() < 1e-6);
    }

    #[test]
    fn index_errors_are_reported() {
        let track = KeyframeTrack::new().with_key(1.0f32, Easing::Linear);
        assert!(matches!(
            track.easing(3),
            Err(TrackError::InvalidKeyframeIndex { index: 3, count: 1 })
        ));
    }

    #[test]
    fn validate_flags_degenerate_configurations() {
        let track: KeyframeTrack<f32> = KeyframeTrack::new().with_key(1.0, Easing::Linear);
        assert!(matches!(
            track.validate(),
            Err(TrackError::DegenerateTrack { .. })
        ));
    }
}
