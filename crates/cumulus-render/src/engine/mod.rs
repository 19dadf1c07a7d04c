//! The wgpu device, its output target and the camera.

mod capture;

use std::sync::Arc;

use crate::camera::Camera;
use crate::capabilities::VolumeCapabilities;
use crate::error::{RenderError, RenderResult};

pub use capture::OffscreenTarget;

/// Format of headless render targets. Not sRGB, so shader output lands in the
/// image unchanged.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Where a frame is being drawn.
pub enum FrameTarget {
    /// A swapchain image to present afterwards.
    Surface {
        texture: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    /// The engine's offscreen texture.
    Offscreen { view: wgpu::TextureView },
}

impl FrameTarget {
    /// The view to render into.
    pub fn view(&self) -> &wgpu::TextureView {
        match self {
            Self::Surface { view, .. } | Self::Offscreen { view } => view,
        }
    }

    /// Presents a surface frame. Offscreen frames stay for [`RenderEngine::capture_frame`].
    pub fn present(self) {
        if let Self::Surface { texture, .. } = self {
            texture.present();
        }
    }
}

/// The main render engine.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The graphics adapter.
    pub adapter: wgpu::Adapter,
    /// The logical device.
    pub device: wgpu::Device,
    /// The command queue.
    pub queue: wgpu::Queue,
    /// The window surface (None for headless).
    pub surface: Option<wgpu::Surface<'static>>,
    /// Output format and size.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// What the adapter offers for volume textures.
    pub capabilities: VolumeCapabilities,
    /// The main camera.
    pub camera: Camera,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
    pub(crate) offscreen: Option<OffscreenTarget>,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`.
    ///
    /// Fails with [`RenderError::MissingCapability`] before any device is
    /// created if the adapter cannot hold a `volume_resolution`^3 volume.
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        volume_resolution: u32,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let capabilities = VolumeCapabilities::query(&adapter);
        capabilities.require(volume_resolution)?;

        let (device, queue) = Self::request_device(&adapter, "cumulus device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::InvalidState("surface reports no formats".into()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "windowed engine on {} ({width}x{height}, {surface_format:?})",
            adapter.get_info().name
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: Some(surface),
            surface_config,
            capabilities,
            camera: Camera::new(width as f32 / height as f32),
            width,
            height,
            offscreen: None,
        })
    }

    /// Creates a render engine drawing into an offscreen texture.
    pub async fn new_headless(
        width: u32,
        height: u32,
        volume_resolution: u32,
    ) -> RenderResult<Self> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let capabilities = VolumeCapabilities::query(&adapter);
        capabilities.require(volume_resolution)?;

        let (device, queue) = Self::request_device(&adapter, "cumulus device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: HEADLESS_FORMAT,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let offscreen = OffscreenTarget::new(&device, HEADLESS_FORMAT, width, height);

        log::info!(
            "headless engine on {} ({width}x{height})",
            adapter.get_info().name
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface: None,
            surface_config,
            capabilities,
            camera: Camera::new(width as f32 / height as f32),
            width,
            height,
            offscreen: Some(offscreen),
        })
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        label: &str,
    ) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        // The adapter's own limits are always satisfiable and include its 3D extent.
        Ok(adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?)
    }

    /// Format pipelines must target.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Resizes the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
        if self.offscreen.is_some() {
            self.offscreen = Some(OffscreenTarget::new(
                &self.device,
                self.surface_config.format,
                width,
                height,
            ));
        }

        self.camera.set_aspect_ratio(width as f32 / height as f32);
    }

    /// Reconfigures the surface after it was lost or outdated.
    pub fn reconfigure(&self) {
        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
    }

    /// Gets the target for the next frame.
    pub fn begin_frame(&self) -> RenderResult<FrameTarget> {
        if let Some(ref surface) = self.surface {
            let texture = surface.get_current_texture()?;
            let view = texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            return Ok(FrameTarget::Surface { texture, view });
        }
        let offscreen = self
            .offscreen
            .as_ref()
            .ok_or_else(|| RenderError::InvalidState("engine has no render target".into()))?;
        Ok(FrameTarget::Offscreen {
            view: offscreen.view(),
        })
    }
}
