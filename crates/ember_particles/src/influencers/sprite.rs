//! Sprite influencer
//!
//! Animates the particle's sprite-sheet frame, either walking the sheet
//! row-major or following an explicit frame sequence. Frame timing comes
//! from a fixed duration (cycling) or is spread across the particle's
//! lifespan so the animation plays exactly once. The sheet dimensions live
//! in the emitter settings; per-particle timing lives in two float slots.

use crate::error::Result;
use crate::influencers::{Influencer, InfluencerConfig, InfluencerSnapshot, StageContext};
use crate::particle::Particle;
use crate::pool::{FloatSlot, SlotRegistry};
use rand::Rng;

/// Sprite-sheet frame animation
#[derive(Clone)]
pub struct SpriteInfluencer {
    animate: bool,
    random_start_frame: bool,
    frame_sequence: Option<Vec<u32>>,
    cycle: bool,
    fixed_duration: f32,
    enabled: bool,
    interval_slot: Option<FloatSlot>,
    duration_slot: Option<FloatSlot>,
}

impl Default for SpriteInfluencer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteInfluencer {
    pub fn new() -> Self {
        Self {
            animate: true,
            random_start_frame: false,
            frame_sequence: None,
            cycle: false,
            fixed_duration: 0.0,
            enabled: true,
            interval_slot: None,
            duration_slot: None,
        }
    }

    /// Animate frames over the particle's life, or hold the start frame
    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    pub fn animate(&self) -> bool {
        self.animate
    }

    /// Start each particle on a random frame
    pub fn set_random_start_frame(&mut self, random_start_frame: bool) {
        self.random_start_frame = random_start_frame;
    }

    pub fn random_start_frame(&self) -> bool {
        self.random_start_frame
    }

    /// Play an explicit list of sheet frames instead of walking row-major
    pub fn set_frame_sequence(&mut self, frames: Option<Vec<u32>>) {
        self.frame_sequence = frames;
    }

    pub fn frame_sequence(&self) -> Option<&[u32]> {
        self.frame_sequence.as_deref()
    }

    /// Cycle frames at a fixed interval (zero reverts to spreading the
    /// animation across each particle's lifespan)
    pub fn set_fixed_duration(&mut self, duration: f32) {
        if duration != 0.0 {
            self.cycle = true;
            self.fixed_duration = duration;
        } else {
            self.cycle = false;
            self.fixed_duration = 0.0;
        }
    }

    pub fn fixed_duration(&self) -> f32 {
        self.fixed_duration
    }

    fn frame_count(&self, total: u32) -> u32 {
        match &self.frame_sequence {
            Some(seq) if !seq.is_empty() => seq.len() as u32,
            _ => total,
        }
    }

    fn apply_frame(particle: &mut Particle, frame: u32, cols: u32) {
        particle.sprite_row = frame / cols;
        particle.sprite_col = frame % cols;
    }

    fn advance_frame(&self, particle: &mut Particle, cols: u32, rows: u32) {
        match &self.frame_sequence {
            Some(seq) if !seq.is_empty() => {
                let position = (particle.sprite_index as usize + 1) % seq.len();
                particle.sprite_index = position as u32;
                Self::apply_frame(particle, seq[position], cols);
            }
            _ => {
                particle.sprite_col += 1;
                if particle.sprite_col == cols {
                    particle.sprite_col = 0;
                    particle.sprite_row += 1;
                    if particle.sprite_row == rows {
                        particle.sprite_row = 0;
                    }
                }
                particle.sprite_index = particle.sprite_row * cols + particle.sprite_col;
            }
        }
    }
}

impl Influencer for SpriteInfluencer {
    fn name(&self) -> &'static str {
        "sprite"
    }

    fn register_slots(&mut self, registry: &mut SlotRegistry) {
        self.interval_slot = Some(registry.register_float_slot());
        self.duration_slot = Some(registry.register_float_slot());
    }

    fn initialize(&mut self, particle: &mut Particle, ctx: &mut StageContext<'_>) {
        let (Some(interval_slot), Some(duration_slot)) = (self.interval_slot, self.duration_slot)
        else {
            return;
        };

        let cols = ctx.settings.sprite_cols.max(1);
        let rows = ctx.settings.sprite_rows.max(1);
        let total = cols * rows;

        if self.random_start_frame {
            match &self.frame_sequence {
                Some(seq) if !seq.is_empty() => {
                    let position = ctx.rng.gen_range(0..seq.len());
                    particle.sprite_index = position as u32;
                    Self::apply_frame(particle, seq[position], cols);
                }
                _ => {
                    let frame = ctx.rng.gen_range(0..total);
                    particle.sprite_index = frame;
                    Self::apply_frame(particle, frame, cols);
                }
            }
        } else {
            let frame = self
                .frame_sequence
                .as_ref()
                .and_then(|seq| seq.first().copied())
                .unwrap_or(0);
            particle.sprite_index = 0;
            Self::apply_frame(particle, frame, cols);
        }

        particle.set_float_data(interval_slot, 0.0);
        let duration = if self.cycle {
            self.fixed_duration
        } else {
            particle.lifespan / self.frame_count(total) as f32
        };
        particle.set_float_data(duration_slot, duration);
    }

    fn update(
        &mut self,
        particle: &mut Particle,
        ctx: &mut StageContext<'_>,
        dt: f32,
    ) -> Result<()> {
        if !self.animate {
            return Ok(());
        }
        let (Some(interval_slot), Some(duration_slot)) = (self.interval_slot, self.duration_slot)
        else {
            return Ok(());
        };

        let cols = ctx.settings.sprite_cols.max(1);
        let rows = ctx.settings.sprite_rows.max(1);
        let target = particle.float_data(duration_slot);
        let mut interval = particle.float_data(interval_slot) + dt;

        if target > 0.0 {
            while interval >= target {
                self.advance_frame(particle, cols, rows);
                interval -= target;
            }
        }
        particle.set_float_data(interval_slot, interval);
        Ok(())
    }

    fn reset(&mut self, particle: &mut Particle) {
        particle.sprite_index = 0;
        particle.sprite_col = 0;
        particle.sprite_row = 0;
        if let Some(slot) = self.interval_slot {
            particle.set_float_data(slot, 0.0);
        }
        if let Some(slot) = self.duration_slot {
            particle.set_float_data(slot, 0.0);
        }
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
            config: InfluencerConfig::Sprite {
                animate: self.animate,
                random_start_frame: self.random_start_frame,
                frame_sequence: self.frame_sequence.clone(),
                cycle: self.cycle,
                fixed_duration: self.fixed_duration,
            },
        }
    }
}
