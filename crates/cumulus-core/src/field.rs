//! Procedural density fields.

use std::time::Instant;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{CumulusError, Result};
use crate::noise::{GradientNoise, PermutationTable};

/// Parameters consumed once when a density field is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParameters {
    /// Number of voxels along each axis.
    pub resolution: u32,
    /// Per-axis frequency applied to voxel coordinates before sampling noise.
    pub scale: Vec3,
    /// Radius (in voxels) of the spherical falloff around the grid center.
    /// `None` keeps the raw noise all the way to the faces.
    pub falloff_radius: Option<f32>,
}

impl NoiseParameters {
    /// Parameters producing a rounded cloud: stretched noise with a spherical
    /// falloff of half the grid size.
    #[must_use]
    pub fn cloud(resolution: u32) -> Self {
        Self {
            resolution,
            scale: Vec3::new(0.075, 0.05, 0.075),
            falloff_radius: Some(resolution as f32 / 2.0),
        }
    }

    /// Parameters producing raw noise filling the whole box.
    #[must_use]
    pub fn perlin(resolution: u32) -> Self {
        Self {
            resolution,
            scale: Vec3::splat(0.1),
            falloff_radius: None,
        }
    }

    /// Total voxel count of the grid.
    ///
    /// Fails for a zero resolution or one whose cube does not fit in `usize`.
    pub fn voxel_count(&self) -> Result<usize> {
        voxel_count(self.resolution)
    }
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self::cloud(128)
    }
}

/// A cubic grid of density bytes, x varying fastest, then y, then z.
///
/// The grid is immutable once built: there is no way to write into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityField {
    resolution: u32,
    data: Vec<u8>,
}

impl DensityField {
    /// Synthesizes a field from gradient noise.
    pub fn generate(params: &NoiseParameters, table: &PermutationTable) -> Result<Self> {
        let n = params.resolution;
        let total = params.voxel_count()?;

        let start = Instant::now();
        let noise = GradientNoise::new(table.clone());
        let center = Vec3::splat(n as f32 / 2.0);
        let scale = params.scale.as_dvec3();

        let mut data = Vec::with_capacity(total);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let value = noise.sample(
                        f64::from(x) * scale.x,
                        f64::from(y) * scale.y,
                        f64::from(z) * scale.z,
                    );
                    let mut density = 128.0 + 128.0 * value as f32;

                    if let Some(radius) = params.falloff_radius {
                        let p = Vec3::new(x as f32, y as f32, z as f32);
                        density *= falloff(p.distance(center), radius);
                    }

                    data.push(quantize(density));
                }
            }
        }

        log::info!("generated {n}^3 density field ({} voxels)", data.len());
        log::debug!("density field generation took {:?}", start.elapsed());

        Ok(Self {
            resolution: n,
            data,
        })
    }

    /// Wraps existing voxel bytes in a field.
    pub fn from_raw(resolution: u32, data: Vec<u8>) -> Result<Self> {
        let expected = voxel_count(resolution)?;
        if data.len() != expected {
            return Err(CumulusError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { resolution, data })
    }

    /// Builds a field by evaluating `f` on every voxel.
    pub fn from_fn(resolution: u32, mut f: impl FnMut(u32, u32, u32) -> u8) -> Result<Self> {
        let mut data = Vec::with_capacity(voxel_count(resolution)?);
        for z in 0..resolution {
            for y in 0..resolution {
                for x in 0..resolution {
                    data.push(f(x, y, z));
                }
            }
        }
        Ok(Self { resolution, data })
    }

    /// Voxels per axis.
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Density byte at a voxel. Coordinates must be below the resolution.
    #[must_use]
    pub fn get(&self, x: u32, y: u32, z: u32) -> u8 {
        self.data[self.index(x, y, z)]
    }

    /// Linear index of a voxel.
    #[inline]
    #[must_use]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        let n = self.resolution as usize;
        x as usize + n * (y as usize + n * z as usize)
    }

    /// Raw voxel bytes in upload order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// `resolution^3`, rejecting zero and overflow.
fn voxel_count(resolution: u32) -> Result<usize> {
    let n = resolution as usize;
    if n == 0 {
        return Err(CumulusError::InvalidResolution(resolution));
    }
    n.checked_mul(n)
        .and_then(|sq| sq.checked_mul(n))
        .ok_or(CumulusError::InvalidResolution(resolution))
}

/// Spherical falloff `clamp(1 - d / r, 0, 1)^2`.
fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let t = (1.0 - distance / radius).clamp(0.0, 1.0);
    t * t
}

fn quantize(density: f32) -> u8 {
    density.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cloud() -> NoiseParameters {
        NoiseParameters {
            resolution: 24,
            scale: Vec3::new(0.15, 0.1, 0.15),
            falloff_radius: Some(12.0),
        }
    }

    #[test]
    fn test_generate_size() {
        let field = DensityField::generate(&small_cloud(), &PermutationTable::classic()).unwrap();
        assert_eq!(field.resolution(), 24);
        assert_eq!(field.as_bytes().len(), 24 * 24 * 24);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let params = small_cloud();
        let table = PermutationTable::from_seed(42);
        let a = DensityField::generate(&params, &table).unwrap();
        let b = DensityField::generate(&params, &table).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_tables_differ() {
        let params = NoiseParameters::perlin(16);
        let a = DensityField::generate(&params, &PermutationTable::from_seed(1)).unwrap();
        let b = DensityField::generate(&params, &PermutationTable::from_seed(2)).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_falloff_empties_corners() {
        let field = DensityField::generate(&small_cloud(), &PermutationTable::classic()).unwrap();
        // Corners are farther than the radius from the center.
        assert_eq!(field.get(0, 0, 0), 0);
        assert_eq!(field.get(23, 23, 23), 0);
        assert_eq!(field.get(0, 23, 0), 0);
    }

    #[test]
    fn test_without_falloff_origin_is_mid_gray() {
        // Noise is zero on lattice points, so voxel (0, 0, 0) maps to 128.
        let field =
            DensityField::generate(&NoiseParameters::perlin(8), &PermutationTable::classic())
                .unwrap();
        assert_eq!(field.get(0, 0, 0), 128);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let params = NoiseParameters::perlin(0);
        let err = DensityField::generate(&params, &PermutationTable::classic()).unwrap_err();
        assert!(matches!(err, CumulusError::InvalidResolution(0)));
    }

    #[test]
    fn test_voxel_count_overflow_rejected() {
        assert_eq!(NoiseParameters::perlin(24).voxel_count().unwrap(), 24 * 24 * 24);
        for resolution in [1 << 22, u32::MAX] {
            let params = NoiseParameters::perlin(resolution);
            assert!(matches!(
                params.voxel_count(),
                Err(CumulusError::InvalidResolution(r)) if r == resolution
            ));
            assert!(matches!(
                DensityField::generate(&params, &PermutationTable::classic()),
                Err(CumulusError::InvalidResolution(_))
            ));
        }
        assert!(DensityField::from_fn(u32::MAX, |_, _, _| 0).is_err());
        assert!(DensityField::from_raw(u32::MAX, Vec::new()).is_err());
    }

    #[test]
    fn test_resolution_one() {
        let field =
            DensityField::generate(&NoiseParameters::cloud(1), &PermutationTable::classic())
                .unwrap();
        assert_eq!(field.as_bytes().len(), 1);
    }

    #[test]
    fn test_from_raw_size_mismatch() {
        let err = DensityField::from_raw(4, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            CumulusError::SizeMismatch {
                expected: 64,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_index_order_x_fastest() {
        let field = DensityField::from_fn(3, |x, y, z| (x + 3 * y + 9 * z) as u8).unwrap();
        assert_eq!(field.index(1, 0, 0), 1);
        assert_eq!(field.index(0, 1, 0), 3);
        assert_eq!(field.index(0, 0, 1), 9);
        assert_eq!(field.get(2, 1, 2), 2 + 3 + 18);
    }

    #[test]
    fn test_falloff_curve() {
        assert!((falloff(0.0, 10.0) - 1.0).abs() < f32::EPSILON);
        assert!((falloff(5.0, 10.0) - 0.25).abs() < 1e-6);
        assert_eq!(falloff(10.0, 10.0), 0.0);
        // Beyond the radius stays zero instead of growing back after squaring.
        assert_eq!(falloff(25.0, 10.0), 0.0);
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(-3.0), 0);
        assert_eq!(quantize(256.0), 255);
        assert_eq!(quantize(127.9), 127);
    }
}
