//! Headless rendering API for cumulus.
//!
//! Renders a single frame without opening a window, either on the GPU through
//! an offscreen target or entirely on the CPU. Useful for integration tests,
//! batch output and machines without a display.

use std::path::Path;

use cumulus_core::software::RgbaImage;
use cumulus_core::{CumulusError, Options, Result};
use cumulus_render::{Camera, RenderEngine};
use pollster::FutureExt;

use crate::orchestrator::VolumeRenderer;

/// Renders one frame to a raw RGBA pixel buffer on the GPU.
///
/// The returned buffer has `width * height * 4` bytes, ordered row by row
/// from the top-left corner. Fails with a capability error before the field
/// is generated if the adapter cannot hold the volume.
///
/// # Example
/// ```no_run
/// use cumulus::{render_to_image, Options};
///
/// let pixels = render_to_image(&Options::cloud(), 640, 480).unwrap();
/// assert_eq!(pixels.len(), 640 * 480 * 4);
/// ```
pub fn render_to_image(options: &Options, width: u32, height: u32) -> Result<Vec<u8>> {
    let _ = env_logger::try_init();

    let engine = RenderEngine::new_headless(width, height, options.noise.resolution)
        .block_on()
        .map_err(|e| CumulusError::RenderError(format!("Failed to create headless engine: {e}")))?;

    let mut renderer = VolumeRenderer::new(options.clone());
    renderer.initialize(&engine)?;
    renderer.render(&engine, 0.0)?;

    let pixels = engine
        .capture_frame()
        .map_err(|e| CumulusError::RenderError(format!("Failed to capture frame: {e}")))?;
    renderer.dispose();
    Ok(pixels)
}

/// Renders one frame on the GPU and saves it as PNG or JPEG.
///
/// # Example
/// ```no_run
/// use cumulus::{render_to_file, Options};
///
/// render_to_file(&Options::perlin(), "perlin.png", 800, 600).unwrap();
/// ```
pub fn render_to_file(
    options: &Options,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<()> {
    let data = render_to_image(options, width, height)?;
    cumulus_render::save_image(path, &data, width, height)
        .map_err(|e| CumulusError::RenderError(format!("Failed to save image: {e}")))
}

/// Renders the same framing as [`render_to_image`] on the CPU.
///
/// Slow for large images, but needs no adapter.
pub fn render_software(options: &Options, width: u32, height: u32) -> Result<RgbaImage> {
    let _ = env_logger::try_init();
    let camera = Camera::new(width.max(1) as f32 / height.max(1) as f32);
    let mut renderer = VolumeRenderer::new(options.clone());
    renderer.render_software(&camera, width, height)
}
