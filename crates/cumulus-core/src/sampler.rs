//! CPU sampling of a density field.
//!
//! Matches what the GPU does with an `R8Unorm` 3D texture bound through a
//! linear, clamp-to-edge sampler: texel centers sit at `(i + 0.5) / N`, values
//! are normalized to `[0, 1]`, and lookups outside the unit cube read the
//! nearest face instead of wrapping around.

use glam::Vec3;

use crate::field::DensityField;

/// Anything the ray marcher can read density from.
pub trait DensitySource {
    /// Density in `[0, 1]` at texture coordinates `uvw` (nominally `[0, 1]^3`).
    fn density(&self, uvw: Vec3) -> f32;
}

/// Trilinear, clamp-to-edge reader over a [`DensityField`].
#[derive(Debug, Clone)]
pub struct VolumeSampler {
    field: DensityField,
}

impl VolumeSampler {
    /// Takes ownership of the field.
    #[must_use]
    pub fn new(field: DensityField) -> Self {
        Self { field }
    }

    /// Returns the underlying field.
    #[must_use]
    pub fn field(&self) -> &DensityField {
        &self.field
    }

    /// Normalized density of a voxel, clamping the coordinate into the grid.
    fn texel(&self, x: i64, y: i64, z: i64) -> f32 {
        let max = i64::from(self.field.resolution()) - 1;
        let x = x.clamp(0, max) as u32;
        let y = y.clamp(0, max) as u32;
        let z = z.clamp(0, max) as u32;
        f32::from(self.field.get(x, y, z)) / 255.0
    }
}

impl DensitySource for VolumeSampler {
    fn density(&self, uvw: Vec3) -> f32 {
        let n = self.field.resolution() as f32;
        let t = uvw * n - Vec3::splat(0.5);
        let base = t.floor();
        let f = t - base;

        let x0 = base.x as i64;
        let y0 = base.y as i64;
        let z0 = base.z as i64;

        let c000 = self.texel(x0, y0, z0);
        let c100 = self.texel(x0 + 1, y0, z0);
        let c010 = self.texel(x0, y0 + 1, z0);
        let c110 = self.texel(x0 + 1, y0 + 1, z0);
        let c001 = self.texel(x0, y0, z0 + 1);
        let c101 = self.texel(x0 + 1, y0, z0 + 1);
        let c011 = self.texel(x0, y0 + 1, z0 + 1);
        let c111 = self.texel(x0 + 1, y0 + 1, z0 + 1);

        let c00 = lerp(c000, c100, f.x);
        let c10 = lerp(c010, c110, f.x);
        let c01 = lerp(c001, c101, f.x);
        let c11 = lerp(c011, c111, f.x);

        let c0 = lerp(c00, c10, f.y);
        let c1 = lerp(c01, c11, f.y);

        lerp(c0, c1, f.z)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
