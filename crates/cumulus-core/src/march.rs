//! Reference ray marcher.
//!
//! This is the CPU twin of `raymarch.wgsl` in `cumulus-render`: same segment,
//! same sample placement, same soft edge and same accumulation. Keep the two in
//! step when either changes.

use glam::{Vec3, Vec4};

use crate::params::{RayMarchParams, ShadingFeatures};
use crate::ray::{inside_unit_cube, Ray};
use crate::sampler::DensitySource;

/// Offset between the two gradient probes of the shaded variant.
pub const SHADE_OFFSET: f32 = 0.01;

/// Sample placement within the first step when jitter is off.
pub const CENTERED_JITTER: f32 = 0.5;

/// What a single ray accumulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Accumulated color.
    pub color: Vec3,
    /// Accumulated opacity in `[0, 1]`.
    pub opacity: f32,
    /// Number of density samples taken.
    pub samples: u32,
}

impl MarchResult {
    /// Nothing was hit.
    #[must_use]
    pub fn empty(base_color: Vec3) -> Self {
        Self {
            color: base_color,
            opacity: 0.0,
            samples: 0,
        }
    }

    /// Alpha-blends the result over a background: `mix(background, color, opacity)`.
    #[must_use]
    pub fn composite(&self, background: Vec3) -> Vec4 {
        background.lerp(self.color, self.opacity).extend(self.opacity)
    }
}

/// `smoothstep(threshold, threshold + range, d)` with `range == 0` treated as a
/// hard step.
#[must_use]
pub fn soft_edge(threshold: f32, range: f32, d: f32) -> f32 {
    if range <= 0.0 {
        return if d > threshold { 1.0 } else { 0.0 };
    }
    let t = ((d - threshold) / range).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Marches one ray through the unit cube.
///
/// `jitter` places the first sample at that fraction of a step past the entry
/// point; [`CENTERED_JITTER`] samples segment midpoints. Parameters are used
/// as given: clamp them beforehand.
pub fn march(
    ray: &Ray,
    volume: &impl DensitySource,
    params: &RayMarchParams,
    features: ShadingFeatures,
    jitter: f32,
) -> MarchResult {
    let Some((t_enter, t_exit)) = ray.intersect_unit_cube() else {
        return MarchResult::empty(params.base_color);
    };

    let steps = params.steps.max(1);
    let entry = ray.at(t_enter);
    let exit = ray.at(t_exit);
    let step = (exit - entry) / steps as f32;

    let mut p = entry + step * jitter;
    let mut color = params.base_color;
    let mut opacity = 0.0_f32;
    let mut samples = 0;

    for _ in 0..steps {
        if !inside_unit_cube(p) {
            break;
        }

        let d = volume.density(p + Vec3::splat(0.5));
        samples += 1;

        if d > params.threshold {
            let c = soft_edge(params.threshold, params.range, d);
            opacity = (opacity + c * params.opacity).min(1.0);

            let sample_color = if features.shaded {
                params.base_color * shade(volume, p)
            } else {
                params.base_color
            };
            color = color.lerp(sample_color, c);
        }

        if opacity >= 1.0 {
            break;
        }
        p += step;
    }

    MarchResult {
        color,
        opacity,
        samples,
    }
}

/// Brightness from the density gradient along the (1, 1, 1) diagonal plus a
/// gentle tilt across x and y.
fn shade(volume: &impl DensitySource, p: Vec3) -> f32 {
    let uvw = p + Vec3::splat(0.5);
    let h = Vec3::splat(SHADE_OFFSET);
    let light = volume.density(uvw - h) - volume.density(uvw + h);
    (0.8 + light * 3.0 + (p.x + p.y) * 0.25).clamp(0.0, 1.0)
}

/// Per-pixel, per-frame start offset in `[0, 1)`.
///
/// Wang hash of the pixel coordinate and frame counter, identical to the
/// shader's.
#[must_use]
pub fn jitter_offset(pixel_x: u32, pixel_y: u32, frame: u32) -> f32 {
    let seed = pixel_x
        .wrapping_mul(1973)
        .wrapping_add(pixel_y.wrapping_mul(9277))
        .wrapping_add(frame.wrapping_mul(26699));
    let h = wang_hash(seed | 1);
    (h & 0x00ff_ffff) as f32 / 16_777_216.0
}

fn wang_hash(seed: u32) -> u32 {
    let mut s = (seed ^ 61) ^ (seed >> 16);
    s = s.wrapping_mul(9);
    s ^= s >> 4;
    s = s.wrapping_mul(0x27d4_eb2d);
    s ^ (s >> 15)
}
