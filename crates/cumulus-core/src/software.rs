//! CPU rendering of a density volume.
//!
//! Produces the same picture as the GPU pass, one [`march`] per pixel. Used by
//! tests and by the headless entry point when no adapter is available.

use glam::{Mat4, Vec2, Vec3};

use crate::march::{jitter_offset, march, CENTERED_JITTER};
use crate::params::{RayMarchParams, ShadingFeatures};
use crate::ray::Ray;
use crate::sampler::DensitySource;

/// Camera and placement for one software frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftwareView {
    /// Box-local to world transform.
    pub model: Mat4,
    /// Combined projection and view matrix.
    pub view_proj: Mat4,
    /// Camera position in world space.
    pub camera_position: Vec3,
    /// Color behind the volume.
    pub background: Vec3,
    /// Frame counter fed to the jitter hash.
    pub frame: u32,
}

/// An 8-bit RGBA image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// RGBA bytes of the pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Local-space ray through the center of pixel `(x, y)`.
#[must_use]
pub fn pixel_ray(view: &SoftwareView, x: u32, y: u32, width: u32, height: u32) -> Ray {
    let ndc = Vec2::new(
        (x as f32 + 0.5) / width as f32 * 2.0 - 1.0,
        1.0 - (y as f32 + 0.5) / height as f32 * 2.0,
    );
    let world = view
        .view_proj
        .inverse()
        .project_point3(ndc.extend(0.5));
    let to_local = view.model.inverse();
    Ray::through(
        to_local.transform_point3(view.camera_position),
        to_local.transform_point3(world),
    )
}

/// Renders `volume` into a `width` x `height` image.
///
/// Pixels are composited over the background and written fully opaque, which
/// is what the GPU pass leaves in a target cleared to the background color.
pub fn render(
    volume: &impl DensitySource,
    params: &RayMarchParams,
    features: ShadingFeatures,
    view: &SoftwareView,
    width: u32,
    height: u32,
) -> RgbaImage {
    let params = params.clamped();
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height {
        for x in 0..width {
            let jitter = if features.jitter {
                jitter_offset(x, y, view.frame)
            } else {
                CENTERED_JITTER
            };
            let ray = pixel_ray(view, x, y, width, height);
            let rgb = march(&ray, volume, &params, features, jitter)
                .composite(view.background)
                .truncate();
            pixels.extend_from_slice(&[to_byte(rgb.x), to_byte(rgb.y), to_byte(rgb.z), 255]);
        }
    }

    log::debug!("software render {width}x{height} done");
    RgbaImage {
        width,
        height,
        pixels,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
