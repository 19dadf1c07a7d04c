//! Adapter capabilities the volume renderer depends on.

use crate::error::{RenderError, RenderResult};

/// Format of the density texture.
pub const VOLUME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// What an adapter offers for 3D density textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCapabilities {
    /// Largest extent of a 3D texture along any axis.
    pub max_texture_dimension_3d: u32,
    /// Whether [`VOLUME_FORMAT`] supports linear filtering.
    pub filterable: bool,
}

impl VolumeCapabilities {
    /// Reads the capabilities of `adapter`.
    pub fn query(adapter: &wgpu::Adapter) -> Self {
        let limits = adapter.limits();
        let features = adapter.get_texture_format_features(VOLUME_FORMAT);
        let caps = Self {
            max_texture_dimension_3d: limits.max_texture_dimension_3d,
            filterable: features
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE),
        };
        log::debug!("volume capabilities: {caps:?}");
        caps
    }

    /// Fails unless a `resolution`^3 volume can be uploaded and filtered.
    pub fn require(&self, resolution: u32) -> RenderResult<()> {
        if resolution > self.max_texture_dimension_3d {
            return Err(RenderError::MissingCapability {
                capability: "max_texture_dimension_3d",
                detail: format!(
                    "volume needs {resolution}, adapter allows {}",
                    self.max_texture_dimension_3d
                ),
            });
        }
        if !self.filterable {
            return Err(RenderError::MissingCapability {
                capability: "filterable_r8unorm",
                detail: "adapter cannot linearly filter R8Unorm textures".into(),
            });
        }
        Ok(())
    }
}
