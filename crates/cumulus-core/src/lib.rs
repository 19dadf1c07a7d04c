//! Core types for cumulus.
//!
//! Everything here is independent of the GPU:
//! - [`noise`] and [`field`] build the 3D density grid
//! - [`sampler`], [`ray`] and [`march`] are the reference ray marcher
//! - [`params`], [`options`] and [`lifecycle`] hold the renderer's state
//! - [`software`] renders whole images on the CPU

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid sizes and pixel coordinates move between u32, usize and f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod error;
pub mod field;
pub mod lifecycle;
pub mod march;
pub mod noise;
pub mod options;
pub mod params;
pub mod ray;
pub mod sampler;
pub mod software;
pub mod transform;

pub use error::{CumulusError, Result};
pub use field::{DensityField, NoiseParameters};
pub use lifecycle::Stage;
pub use march::{jitter_offset, march, soft_edge, MarchResult};
pub use noise::{GradientNoise, PermutationTable};
pub use options::Options;
pub use params::{ParamUpdate, RayMarchParams, ShadingFeatures};
pub use ray::Ray;
pub use sampler::{DensitySource, VolumeSampler};
pub use software::{RgbaImage, SoftwareView};
pub use transform::VolumeTransform;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
