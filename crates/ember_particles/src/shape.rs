//! Emission shapes
//!
//! Spawn geometry comes from a triangulated surface. The sampler walks faces
//! in a repeatable order (so surface-anchored particles can re-derive their
//! face every frame) and draws independent uniform samples for spawn-time
//! randomization. There is no implicit default surface: every sampler must
//! be initialized before use.

use crate::error::{EffectError, Result};
use ember_core::Vec3;
use rand::Rng;

/// One triangular face with derived sampling data
#[derive(Clone, Copy, Debug)]
struct Face {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    center: Vec3,
    normal: Vec3,
}

impl Face {
    fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let center = (a + b + c) * (1.0 / 3.0);
        let normal = (b - a).cross(c - a).normalize();
        let normal = if normal == Vec3::ZERO {
            Vec3::UNIT_Y
        } else {
            normal
        };
        Self {
            a,
            b,
            c,
            center,
            normal,
        }
    }
}

/// The reference emission surface: one triangle with a symmetric footprint
/// of `size` units, re-centered on its centroid at the local origin
#[derive(Clone, Debug)]
pub struct TriangleShape {
    /// Vertex position buffer
    pub positions: Vec<Vec3>,
    /// Triangle index buffer
    pub indices: Vec<u32>,
    size: f32,
}

impl TriangleShape {
    pub fn new(size: f32) -> Self {
        let half = size / 2.0;
        let mut points = [
            Vec3::new(-half, 0.0, half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(-half, 0.0, -half),
        ];
        let center = (points[0] + points[1] + points[2]) * (1.0 / 3.0);
        for point in &mut points {
            *point -= center;
        }
        Self {
            positions: points.to_vec(),
            indices: vec![0, 1, 2],
            size,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

/// Face sampler over a triangulated emission surface
///
/// Sequential sampling (`set_next` / `set_next_index`) is deterministic:
/// re-selecting the same face always yields the same translation and
/// direction. Stochastic sampling (`random_translation`) draws a fresh
/// uniform point each call.
#[derive(Clone, Debug, Default)]
pub struct EmitterShapeSampler {
    faces: Vec<Face>,
    cursor: usize,
    current: usize,
    bound_center: Vec3,
}

impl EmitterShapeSampler {
    /// An uninitialized sampler; every query fails until `init` is called
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)build the sampler from the reference triangle shape.
    ///
    /// Discards all previous geometry: face indices returned before this
    /// call belong to the old surface and are no longer valid.
    pub fn init(&mut self, size: f32) {
        let shape = TriangleShape::new(size);
        // The reference shape is always a valid surface.
        let _ = self.init_from_mesh(&shape.positions, &shape.indices);
    }

    /// (Re)build the sampler from an arbitrary triangulated surface
    pub fn init_from_mesh(&mut self, positions: &[Vec3], indices: &[u32]) -> Result<()> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(EffectError::InvalidShapeMesh);
        }
        let mut faces = Vec::with_capacity(indices.len() / 3);
        for triple in indices.chunks_exact(3) {
            let fetch = |i: u32| {
                positions
                    .get(i as usize)
                    .copied()
                    .ok_or(EffectError::InvalidShapeMesh)
            };
            faces.push(Face::new(fetch(triple[0])?, fetch(triple[1])?, fetch(triple[2])?));
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in positions {
            min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }

        tracing::debug!(faces = faces.len(), "emission shape rebuilt");
        self.faces = faces;
        self.cursor = 0;
        self.current = 0;
        self.bound_center = (min + max) * 0.5;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.faces.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Select the next face in the repeatable visiting order
    pub fn set_next(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.current = self.cursor;
        self.cursor = (self.cursor + 1) % self.faces.len();
        Ok(())
    }

    /// Select an explicit face, e.g. one a particle stored at spawn
    pub fn set_next_index(&mut self, index: usize) -> Result<()> {
        self.ensure_initialized()?;
        if index >= self.faces.len() {
            return Err(EffectError::InvalidTriangleIndex {
                index,
                count: self.faces.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Index of the face chosen by the most recent `set_next` call
    pub fn triangle_index(&self) -> usize {
        self.current
    }

    /// Deterministic spawn point on the current face, in the shape's local
    /// frame
    pub fn next_translation(&self) -> Result<Vec3> {
        Ok(self.current_face()?.center)
    }

    /// Outward direction for the current face
    pub fn next_direction(&self) -> Result<Vec3> {
        Ok(self.current_face()?.normal)
    }

    /// Center of the surface's bounding box
    pub fn center(&self) -> Result<Vec3> {
        self.ensure_initialized()?;
        Ok(self.bound_center)
    }

    /// Fresh uniform sample on the current face, returned as an offset from
    /// the deterministic spawn point
    pub fn random_translation<R: Rng>(&self, rng: &mut R) -> Result<Vec3> {
        let face = self.current_face()?;
        // Uniform barycentric point: (1-sqrt(r1))A + sqrt(r1)(1-r2)B + sqrt(r1)r2 C
        let r1 = rng.gen::<f32>().sqrt();
        let r2 = rng.gen::<f32>();
        let point = face.a * (1.0 - r1) + face.b * (r1 * (1.0 - r2)) + face.c * (r1 * r2);
        Ok(point - face.center)
    }

    fn current_face(&self) -> Result<&Face> {
        self.ensure_initialized()?;
        Ok(&self.faces[self.current])
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.faces.is_empty() {
            return Err(EffectError::ShapeNotInitialized);
        }
        Ok(())
    }
}
