//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The adapter cannot hold or filter the volume texture.
    #[error("missing capability {capability}: {detail}")]
    MissingCapability {
        capability: &'static str,
        detail: String,
    },

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Operation needs resources that are not (or no longer) there.
    #[error("invalid renderer state: {0}")]
    InvalidState(String),

    /// Surface lost.
    #[error("surface lost")]
    SurfaceLost,

    /// Surface outdated.
    #[error("surface outdated")]
    SurfaceOutdated,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,

    /// Reading the frame back from the GPU failed.
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost => Self::SurfaceLost,
            wgpu::SurfaceError::Outdated => Self::SurfaceOutdated,
            wgpu::SurfaceError::OutOfMemory => Self::OutOfMemory,
            wgpu::SurfaceError::Timeout => Self::Timeout,
            other => Self::InvalidState(other.to_string()),
        }
    }
}

impl From<cumulus_core::CumulusError> for RenderError {
    fn from(err: cumulus_core::CumulusError) -> Self {
        Self::InvalidState(err.to_string())
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_core::{CumulusError, Stage};

    #[test]
    fn test_surface_error_mapping() {
        assert!(matches!(
            RenderError::from(wgpu::SurfaceError::Lost),
            RenderError::SurfaceLost
        ));
        assert!(matches!(
            RenderError::from(wgpu::SurfaceError::Outdated),
            RenderError::SurfaceOutdated
        ));
    }

    #[test]
    fn test_missing_capability_message() {
        let err = RenderError::MissingCapability {
            capability: "max_texture_dimension_3d",
            detail: "need 256, adapter allows 128".into(),
        };
        assert_eq!(
            err.to_string(),
            "missing capability max_texture_dimension_3d: need 256, adapter allows 128"
        );
    }

    #[test]
    fn test_core_error_becomes_invalid_state() {
        let core = CumulusError::InvalidTransition {
            from: Stage::Disposed,
            to: Stage::Rendering,
        };
        assert!(matches!(RenderError::from(core), RenderError::InvalidState(_)));
    }
}
