//! Individual particle data

use crate::pool::{FloatSlot, ObjectSlot, SlotLayout};
use ember_core::{Color, Vec3};
use std::any::Any;

/// One fixed-size particle record
///
/// Records live in the pool for the lifetime of the owning emitter; identity
/// (the pool index) is reused across activations. Influencers attach private
/// per-particle state through the float/object extension slots instead of
/// subclassing the record, so the pool stays homogeneous.
#[derive(Default)]
pub struct Particle {
    /// Current position (emitter-local frame)
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Emitter translation at the moment of release
    pub initial_position: Vec3,
    /// Random emission-point offset chosen at spawn
    pub random_offset: Vec3,
    /// Velocity magnitude at spawn
    pub initial_speed: f32,
    /// Rotation angle per axis (radians)
    pub angles: Vec3,

    /// Total lifespan in seconds
    pub lifespan: f32,
    /// Remaining life in seconds
    pub life: f32,
    /// Normalized age: 0 at spawn, 1 at death
    pub blend: f32,
    /// Normalized age through the emitter's base easing
    pub interp_blend: f32,
    /// Whether this record is currently simulated
    pub active: bool,
    /// This record's pool index
    pub index: usize,
    /// Index of the emission-shape face the particle was released from
    pub triangle_index: usize,

    /// Current color
    pub color: Color,
    /// Current alpha
    pub alpha: f32,
    /// Current size per axis
    pub size: Vec3,
    /// Sprite sheet column
    pub sprite_col: u32,
    /// Sprite sheet row
    pub sprite_row: u32,
    /// Sprite frame index
    pub sprite_index: u32,

    floats: Vec<f32>,
    objects: Vec<Option<Box<dyn Any>>>,
}

impl Particle {
    pub(crate) fn new(index: usize, layout: SlotLayout) -> Self {
        Self {
            index,
            color: Color::WHITE,
            alpha: 1.0,
            size: Vec3::ONE,
            floats: vec![0.0; layout.floats],
            objects: (0..layout.objects).map(|_| None).collect(),
            ..Self::default()
        }
    }

    /// Grow the extension-slot arrays to a new layout, preserving every
    /// previously written value at its original index. Never shrinks.
    pub(crate) fn resize_slots(&mut self, layout: SlotLayout) {
        if layout.floats > self.floats.len() {
            self.floats.resize(layout.floats, 0.0);
        }
        while self.objects.len() < layout.objects {
            self.objects.push(None);
        }
    }

    /// Read a float extension slot
    pub fn float_data(&self, slot: FloatSlot) -> f32 {
        self.floats[slot.index()]
    }

    /// Write a float extension slot
    pub fn set_float_data(&mut self, slot: FloatSlot, value: f32) {
        self.floats[slot.index()] = value;
    }

    /// Ensure an object slot holds a `T`, constructing one on first use.
    ///
    /// The box is allocated once per record and reused across respawns, so
    /// steady-state simulation performs no per-particle heap allocation
    /// after warm-up. A value of a different type is replaced.
    pub fn init_object_data<T: Any>(&mut self, slot: ObjectSlot, factory: impl FnOnce() -> T) {
        let cell = &mut self.objects[slot.index()];
        let stale = matches!(cell, Some(existing) if !existing.is::<T>());
        if cell.is_none() || stale {
            *cell = Some(Box::new(factory()));
        }
    }

    /// Borrow an object extension slot
    pub fn object_data<T: Any>(&self, slot: ObjectSlot) -> Option<&T> {
        self.objects[slot.index()].as_ref()?.downcast_ref()
    }

    /// Mutably borrow an object extension slot
    pub fn object_data_mut<T: Any>(&mut self, slot: ObjectSlot) -> Option<&mut T> {
        self.objects[slot.index()].as_mut()?.downcast_mut()
    }
}

// Object slot contents are opaque, so Debug shows the simulated fields only.
impl std::fmt::Debug for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Particle")
            .field("index", &self.index)
            .field("active", &self.active)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("life", &self.life)
            .field("lifespan", &self.lifespan)
            .field("blend", &self.blend)
            .finish_non_exhaustive()
    }
}

/// GPU-friendly per-particle snapshot for the rendering collaborator
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// Position (xyz) and alpha (w)
    pub position_alpha: [f32; 4],
    /// Per-axis rotation (xyz) and normalized age (w)
    pub rotation_age: [f32; 4],
    /// Size (xyz) and sprite frame index (w)
    pub size_frame: [f32; 4],
    /// Color (rgba)
    pub color: [f32; 4],
}

impl From<&Particle> for ParticleInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position_alpha: [p.position.x, p.position.y, p.position.z, p.alpha],
            rotation_age: [p.angles.x, p.angles.y, p.angles.z, p.blend],
            size_frame: [p.size.x, p.size.y, p.size.z, p.sprite_index as f32],
            color: p.color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SlotRegistry;

    #[test]
    fn object_slot_box_is_reused_across_reinitialization() {
        let mut registry = SlotRegistry::new();
        let slot = registry.register_object_slot();
        let mut particle = Particle::new(0, registry.layout());

        particle.init_object_data(slot, || 7u32);
        let first = particle.object_data::<u32>(slot).map(|v| v as *const u32);
        particle.init_object_data(slot, || 9u32);
        let second = particle.object_data::<u32>(slot).map(|v| v as *const u32);

        // Same allocation, original value untouched by the second factory.
        assert_eq!(first, second);
        assert_eq!(particle.object_data::<u32>(slot), Some(&7));
    }

    #[test]
    fn object_slot_type_mismatch_is_replaced() {
        let mut registry = SlotRegistry::new();
        let slot = registry.register_object_slot();
        let mut particle = Particle::new(0, registry.layout());

        particle.init_object_data(slot, || 7u32);
        particle.init_object_data(slot, || 1.5f64);
        assert_eq!(particle.object_data::<f64>(slot), Some(&1.5));
        assert_eq!(particle.object_data::<u32>(slot), None);
    }

    #[test]
    fn instance_packs_render_fields() {
        let mut registry = SlotRegistry::new();
        let _ = registry.register_float_slot();
        let mut particle = Particle::new(3, registry.layout());
        particle.position = Vec3::new(1.0, 2.0, 3.0);
        particle.alpha = 0.5;
        particle.sprite_index = 4;

        let instance = ParticleInstance::from(&particle);
        assert_eq!(instance.position_alpha, [1.0, 2.0, 3.0, 0.5]);
        assert_eq!(instance.size_frame[3], 4.0);
    }
}
