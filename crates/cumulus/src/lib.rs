//! cumulus: volumetric clouds ray-marched on the GPU.
//!
//! A procedural 3D noise field is baked into a density texture once, then every
//! frame a fragment shader marches rays through the box that holds it and
//! accumulates color and opacity.
//!
//! # Quick Start
//!
//! ```no_run
//! use cumulus::*;
//!
//! fn main() -> Result<()> {
//!     // Soft cloud preset: spherical falloff, smooth edges, shaded
//!     run(Options::cloud())
//! }
//! ```
//!
//! # Controls
//!
//! - Left drag orbits the camera, the wheel zooms, `C` reframes the box
//! - `T`/`G` threshold, `O`/`L` opacity, `R`/`F` range, `]`/`[` steps
//! - `Space` pauses the spin, `Escape` closes the window
//!
//! # Without a window
//!
//! [`render_to_image`] and [`render_to_file`] render one frame offscreen on the
//! GPU; [`render_software`] does the same on the CPU.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

mod app;
mod headless;
pub mod orchestrator;

// Re-export core types
pub use cumulus_core::{
    error::{CumulusError, Result},
    field::{DensityField, NoiseParameters},
    lifecycle::Stage,
    noise::PermutationTable,
    options::Options,
    params::{ParamUpdate, RayMarchParams, ShadingFeatures},
    software::RgbaImage,
    transform::VolumeTransform,
    Mat4, Quat, Vec3, Vec4,
};

// Re-export render types
pub use cumulus_render::{Camera, RenderEngine, RenderError};

pub use headless::{render_software, render_to_file, render_to_image};
pub use orchestrator::VolumeRenderer;

/// Opens a window and renders `options` until it is closed.
///
/// Blocks the calling thread. GPU resources are released before returning.
pub fn run(options: Options) -> Result<()> {
    let _ = env_logger::try_init();
    log::info!(
        "starting cumulus ({}^3 field, {:?})",
        options.noise.resolution,
        options.features
    );
    app::run_app(options)
}
