use super::RenderEngine;
use crate::screenshot::ScreenshotError;

/// An offscreen color texture plus the staging buffer it is read back through.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("offscreen readback buffer"),
            size: u64::from(aligned_bytes_per_row(width) * height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            texture,
            buffer,
            width,
            height,
        }
    }

    pub(crate) fn view(&self) -> wgpu::TextureView {
        self.texture
            .create_view(&wgpu::TextureViewDescriptor::default())
    }
}

/// Bytes per row padded to wgpu's copy alignment.
pub(crate) fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * 4; // RGBA8
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Copies tightly packed rows out of a padded readback.
pub(crate) fn strip_row_padding(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let padded = aligned_bytes_per_row(width) as usize;
    let row_bytes = (width * 4) as usize;
    let mut result = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded;
        result.extend_from_slice(&data[start..start + row_bytes]);
    }
    result
}

impl RenderEngine {
    /// Reads the offscreen target back as tightly packed RGBA8 rows.
    ///
    /// Call after the frame's commands were submitted.
    pub fn capture_frame(&self) -> Result<Vec<u8>, ScreenshotError> {
        let target = self
            .offscreen
            .as_ref()
            .ok_or(ScreenshotError::InvalidImageData)?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture copy encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row(target.width)),
                    rows_per_image: Some(target.height),
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = target.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| ScreenshotError::BufferMapFailed)?
            .map_err(|_| ScreenshotError::BufferMapFailed)?;

        let data = buffer_slice.get_mapped_range();
        let result = strip_row_padding(&data, target.width, target.height);
        drop(data);
        target.buffer.unmap();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aligned_bytes_per_row() {
        assert_eq!(aligned_bytes_per_row(64), 256);
        assert_eq!(aligned_bytes_per_row(65), 512);
        assert_eq!(aligned_bytes_per_row(1), 256);
    }

    #[test]
    fn test_strip_row_padding() {
        let width = 2;
        let padded = aligned_bytes_per_row(width) as usize;
        let mut data = vec![0u8; padded * 2];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[padded..padded + 8].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);
        let packed = strip_row_padding(&data, width, 2);
        assert_eq!(packed, (1..=16).collect::<Vec<u8>>());
    }

    proptest! {
        #[test]
        fn prop_padding_round_trip(width in 1u32..700, height in 1u32..6) {
            let padded = aligned_bytes_per_row(width) as usize;
            prop_assert_eq!(padded % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize, 0);
            prop_assert!(padded >= width as usize * 4);

            let row_bytes = width as usize * 4;
            let mut data = vec![0xAAu8; padded * height as usize];
            let mut expected = Vec::with_capacity(row_bytes * height as usize);
            for row in 0..height as usize {
                for i in 0..row_bytes {
                    let v = ((row * 31 + i) % 251) as u8;
                    data[row * padded + i] = v;
                    expected.push(v);
                }
            }
            prop_assert_eq!(strip_row_padding(&data, width, height), expected);
        }
    }
}
