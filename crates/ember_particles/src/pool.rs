//! Particle pool and extension-slot registry

use crate::error::{EffectError, Result};
use crate::particle::Particle;

/// Identifier of a per-particle float extension slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatSlot(u32);

impl FloatSlot {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn test_slot(raw: u32) -> Self {
        Self(raw)
    }
}

/// Identifier of a per-particle object extension slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectSlot(u32);

impl ObjectSlot {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Width of the per-particle extension-slot arrays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotLayout {
    pub floats: usize,
    pub objects: usize,
}

/// Allocator for extension-slot identifiers
///
/// One registry belongs to each influencer chain; influencers claim their
/// slots exactly once, while the chain is assembled. IDs increase
/// monotonically per slot kind and are never reused, so a claimed slot stays
/// valid for as long as the chain (and any pool built from its layout)
/// exists. Registration is a setup-time operation: it must not happen while
/// particles are simulating, except through the pool-growth path the emitter
/// provides.
#[derive(Clone, Debug, Default)]
pub struct SlotRegistry {
    next_float: u32,
    next_object: u32,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a float slot; returns a strictly increasing, never-reused ID
    pub fn register_float_slot(&mut self) -> FloatSlot {
        let slot = FloatSlot(self.next_float);
        self.next_float += 1;
        slot
    }

    /// Claim an object slot; returns a strictly increasing, never-reused ID
    pub fn register_object_slot(&mut self) -> ObjectSlot {
        let slot = ObjectSlot(self.next_object);
        self.next_object += 1;
        slot
    }

    /// The slot-array width a pool must provide for this registry
    pub fn layout(&self) -> SlotLayout {
        SlotLayout {
            floats: self.next_float as usize,
            objects: self.next_object as usize,
        }
    }
}

/// Fixed-capacity pool of particle records
///
/// Allocated once per emitter and never resized, except to grow the
/// extension-slot arrays when an influencer registers slots after
/// construction. Records transition Free -> Active -> Free; their index is
/// their identity and is reused.
#[derive(Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    free: Vec<usize>,
    layout: SlotLayout,
}

impl ParticlePool {
    /// Pre-allocate `capacity` records with the given slot width
    pub fn with_capacity(capacity: usize, layout: SlotLayout) -> Self {
        let particles = (0..capacity).map(|i| Particle::new(i, layout)).collect();
        // Low indices come back first, matching spawn order to slot order.
        let free = (0..capacity).rev().collect();
        Self {
            particles,
            free,
            layout,
        }
    }

    /// Take the next free record index, or fail with `PoolExhausted`
    pub fn acquire(&mut self) -> Result<usize> {
        self.free.pop().ok_or(EffectError::PoolExhausted {
            capacity: self.particles.len(),
        })
    }

    /// Return a record to the free list, making it eligible for reuse
    pub fn release(&mut self, index: usize) {
        debug_assert!(!self.free.contains(&index), "double release of slot {index}");
        if index < self.particles.len() {
            self.free.push(index);
        }
    }

    /// Grow every record's extension-slot arrays to a new layout, preserving
    /// previously written values at their original indices
    pub fn resize_slots(&mut self, layout: SlotLayout) {
        if layout.floats <= self.layout.floats && layout.objects <= self.layout.objects {
            return;
        }
        tracing::debug!(
            floats = layout.floats,
            objects = layout.objects,
            "growing particle extension slots after pool allocation"
        );
        for particle in &mut self.particles {
            particle.resize_slots(layout);
        }
        self.layout = SlotLayout {
            floats: self.layout.floats.max(layout.floats),
            objects: self.layout.objects.max(layout.objects),
        };
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Infallible access for indices the pool itself handed out
    pub(crate) fn record_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Iterate over records currently flagged active
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.active)
    }
}
