//! Rendering backend for cumulus.
//!
//! This crate provides the wgpu side of the volume renderer:
//! - Device setup, windowed or headless, with a capability check
//! - The density field as a filterable 3D texture
//! - Ray-march shader variants and their pipeline
//! - Orbit camera and frame capture

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Viewport sizes move between u32 and f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod camera;
pub mod capabilities;
pub mod engine;
pub mod error;
pub mod screenshot;
pub mod shader;
pub mod volume_render;
pub mod volume_texture;

pub use camera::Camera;
pub use capabilities::{VolumeCapabilities, VOLUME_FORMAT};
pub use engine::{FrameTarget, OffscreenTarget, RenderEngine, HEADLESS_FORMAT};
pub use error::{RenderError, RenderResult};
pub use screenshot::{save_image, ScreenshotError};
pub use shader::{ShaderBuilder, RAYMARCH_SOURCE};
pub use volume_render::{GpuVolume, RayMarchUniforms, VolumePipeline, VolumeRenderData};
pub use volume_texture::VolumeTexture;
