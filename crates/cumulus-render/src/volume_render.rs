//! GPU resources for ray-marching one density volume inside a unit box.

use cumulus_core::{DensityField, RayMarchParams, ShadingFeatures};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::error::RenderResult;
use crate::shader::ShaderBuilder;
use crate::volume_texture::VolumeTexture;

/// Uniforms for the ray-march shader.
/// Layout must match WGSL `RayMarchUniforms` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct RayMarchUniforms {
    /// Box-local to world transform.
    pub model: [[f32; 4]; 4],
    /// Projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in box-local coordinates.
    pub camera_local: [f32; 3],
    pub threshold: f32,
    pub base_color: [f32; 3],
    pub opacity: f32,
    pub range: f32,
    pub steps: u32,
    /// Frame counter for the jitter hash.
    pub frame: u32,
    /// Padding to 16-byte alignment.
    pub _pad: f32,
}

impl Default for RayMarchUniforms {
    fn default() -> Self {
        Self::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(0.0, 0.0, 2.0),
            &RayMarchParams::default(),
            0,
        )
    }
}

impl RayMarchUniforms {
    /// Packs one frame's worth of state.
    #[must_use]
    pub fn new(
        model: Mat4,
        view_proj: Mat4,
        camera_local: Vec3,
        params: &RayMarchParams,
        frame: u32,
    ) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            camera_local: camera_local.to_array(),
            threshold: params.threshold,
            base_color: params.base_color.to_array(),
            opacity: params.opacity,
            range: params.range,
            steps: params.steps.max(1),
            frame,
            _pad: 0.0,
        }
    }
}

/// Generates the 36 vertices of the unit box `[-0.5, 0.5]^3`, wound
/// counter-clockwise seen from outside.
fn generate_unit_cube() -> Vec<[f32; 3]> {
    // Face order: +X, -X, +Y, -Y, +Z, -Z
    let faces: [[[f32; 3]; 4]; 6] = [
        [[0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5]],
        [[-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5]],
        [[-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5]],
        [[-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5]],
        [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
        [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]],
    ];

    faces
        .iter()
        .flat_map(|quad| [0, 1, 2, 0, 2, 3].map(|i| quad[i]))
        .collect()
}

/// Pipeline for one shader variant.
pub struct VolumePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub features: ShadingFeatures,
}

impl VolumePipeline {
    /// Compiles the variant for `features` and builds its pipeline.
    ///
    /// Only back faces of the box are drawn, so a camera inside the box still
    /// gets one fragment per pixel. Output is alpha-blended over the target.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        features: ShadingFeatures,
    ) -> RenderResult<Self> {
        let shader = ShaderBuilder::raymarch(features).build_module(device)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Ray March Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<RayMarchUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                // Density volume
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D3,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray March Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ray March Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            features,
        })
    }
}

/// Per-volume GPU state: box geometry, uniforms and the bind group tying them
/// to the density texture.
pub struct VolumeRenderData {
    pub vertex_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub num_vertices: u32,
}

impl VolumeRenderData {
    /// Creates render data bound to `volume` through `pipeline`'s layout.
    #[must_use]
    pub fn new(device: &wgpu::Device, pipeline: &VolumePipeline, volume: &VolumeTexture) -> Self {
        let vertices = generate_unit_cube();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("volume box vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ray march uniforms"),
            contents: bytemuck::cast_slice(&[RayMarchUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ray march bind group"),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&volume.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&volume.sampler),
                },
            ],
        });

        Self {
            vertex_buffer,
            uniform_buffer,
            bind_group,
            num_vertices: vertices.len() as u32,
        }
    }

    /// Updates the uniform buffer.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &RayMarchUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    /// Records the box draw into an open render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline: &VolumePipeline) {
        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.num_vertices, 0..1);
    }

    /// Releases the buffers now instead of on drop.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

/// Everything the GPU holds for one volume: texture, pipeline and draw state.
pub struct GpuVolume {
    pub texture: VolumeTexture,
    pub pipeline: VolumePipeline,
    pub data: VolumeRenderData,
}

impl GpuVolume {
    /// Uploads `field` and builds the pipeline for `features`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
        field: &DensityField,
        features: ShadingFeatures,
    ) -> RenderResult<Self> {
        let texture = VolumeTexture::upload(device, queue, field);
        let pipeline = VolumePipeline::new(device, target_format, features)?;
        let data = VolumeRenderData::new(device, &pipeline, &texture);
        Ok(Self {
            texture,
            pipeline,
            data,
        })
    }

    /// Clears `view` to `background` and draws the volume over it.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        uniforms: &RayMarchUniforms,
        background: Vec3,
    ) {
        self.data.update_uniforms(queue, uniforms);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("volume encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Volume Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(background.x),
                            g: f64::from(background.y),
                            b: f64::from(background.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            self.data.draw(&mut pass, &self.pipeline);
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Releases texture and buffers.
    pub fn destroy(&self) {
        self.data.destroy();
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_march_uniforms_size() {
        let size = std::mem::size_of::<RayMarchUniforms>();
        assert_eq!(size % 16, 0, "RayMarchUniforms size ({size} bytes) must be 16-byte aligned");
        // model(64) + view_proj(64) + camera_local(12) + threshold(4) + base_color(12)
        // + opacity(4) + range(4) + steps(4) + frame(4) + pad(4) = 176
        assert_eq!(size, 176, "RayMarchUniforms should be 176 bytes, got {size}");
    }

    #[test]
    fn test_uniforms_pack_params() {
        let params = RayMarchParams {
            steps: 0,
            ..RayMarchParams::default()
        };
        let u = RayMarchUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::X, &params, 7);
        assert_eq!(u.steps, 1);
        assert_eq!(u.frame, 7);
        assert_eq!(u.camera_local, [1.0, 0.0, 0.0]);
        assert_eq!(u.threshold, params.threshold);
    }

    #[test]
    fn test_unit_cube_generation() {
        let vertices = generate_unit_cube();
        assert_eq!(vertices.len(), 36);
        for v in &vertices {
            assert!(v.iter().all(|c| (c.abs() - 0.5).abs() < f32::EPSILON));
        }
    }

    #[test]
    fn test_unit_cube_faces_point_outward() {
        let vertices = generate_unit_cube();
        for tri in vertices.chunks(3) {
            let a = Vec3::from(tri[0]);
            let b = Vec3::from(tri[1]);
            let c = Vec3::from(tri[2]);
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "triangle {tri:?} winds inward");
        }
    }
}
