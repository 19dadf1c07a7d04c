//! The density field as a GPU 3D texture.

use cumulus_core::DensityField;

use crate::capabilities::VOLUME_FORMAT;

/// A single-channel 3D texture holding one density field, plus the trilinear
/// clamp-to-edge sampler the ray marcher reads it with.
pub struct VolumeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl VolumeTexture {
    /// Creates the texture and uploads `field` in one `write_texture`.
    ///
    /// Bytes go up in field order, so x varies fastest, then y, then z.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, field: &DensityField) -> Self {
        let resolution = field.resolution();
        let size = wgpu::Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: resolution,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("density volume"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format: VOLUME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            field.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(resolution),
                rows_per_image: Some(resolution),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D3),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("density sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "uploaded {resolution}^3 density volume ({} bytes)",
            field.as_bytes().len()
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Releases the GPU memory now instead of on drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
