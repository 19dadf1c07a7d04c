//! The per-frame driver and owner of one volume's resources.

use std::time::Instant;

use cumulus_core::software::{self, RgbaImage, SoftwareView};
use cumulus_core::{
    CumulusError, DensityField, Options, ParamUpdate, RayMarchParams, Result, Stage,
    VolumeSampler, VolumeTransform,
};
use cumulus_render::{
    Camera, FrameTarget, GpuVolume, RayMarchUniforms, RenderEngine, RenderError,
};

fn render_error(err: RenderError) -> CumulusError {
    CumulusError::RenderError(err.to_string())
}

/// Drives one volume from field generation to teardown.
///
/// The renderer owns the box transform, the live parameters and every GPU
/// resource of its volume. Nothing is shared with other renderers.
pub struct VolumeRenderer {
    options: Options,
    params: RayMarchParams,
    transform: VolumeTransform,
    stage: Stage,
    frame: u32,
    field: Option<DensityField>,
    gpu: Option<GpuVolume>,
}

impl VolumeRenderer {
    /// Creates an uninitialized renderer.
    pub fn new(options: Options) -> Self {
        let params = options.march.clamped();
        let transform = VolumeTransform::spinning(options.spin_speed);
        Self {
            options,
            params,
            transform,
            stage: Stage::Uninitialized,
            frame: 0,
            field: None,
            gpu: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Parameters the next frame will use.
    pub fn params(&self) -> &RayMarchParams {
        &self.params
    }

    pub fn transform(&self) -> &VolumeTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut VolumeTransform {
        &mut self.transform
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// The generated field, until it has been handed to the GPU.
    pub fn field(&self) -> Option<&DensityField> {
        self.field.as_ref()
    }

    /// Generates the density field on the CPU.
    pub fn generate_field(&mut self) -> Result<&DensityField> {
        self.ensure(Stage::FieldGenerated)?;
        let field = DensityField::generate(&self.options.noise, &self.options.permutation_table())?;
        self.stage.advance(Stage::FieldGenerated)?;
        Ok(self.field.insert(field))
    }

    /// Uploads the field and builds the pipeline for the configured variant.
    ///
    /// The CPU copy of the field is released once the texture exists.
    pub fn upload(&mut self, engine: &RenderEngine) -> Result<()> {
        self.ensure(Stage::TextureUploaded)?;
        let field = self
            .field
            .as_ref()
            .ok_or_else(|| CumulusError::RenderError("no field to upload".into()))?;
        engine
            .capabilities
            .require(field.resolution())
            .map_err(render_error)?;

        let gpu = GpuVolume::new(
            &engine.device,
            &engine.queue,
            engine.target_format(),
            field,
            self.options.features,
        )
        .map_err(render_error)?;

        self.gpu = Some(gpu);
        self.field = None;
        self.stage.advance(Stage::TextureUploaded)
    }

    /// Capability check, field generation, upload and pipeline creation, in
    /// that order.
    pub fn initialize(&mut self, engine: &RenderEngine) -> Result<()> {
        engine
            .capabilities
            .require(self.options.noise.resolution)
            .map_err(render_error)?;
        self.generate_field()?;
        self.upload(engine)?;
        log::info!("volume renderer ready ({:?})", self.options.features);
        Ok(())
    }

    /// Applies a control change. The next frame uses the clamped value.
    pub fn apply(&mut self, update: ParamUpdate) -> Result<()> {
        if self.stage == Stage::Disposed {
            return Err(CumulusError::InvalidTransition {
                from: Stage::Disposed,
                to: Stage::Rendering,
            });
        }
        self.params.apply(update);
        log::debug!("parameter update {update:?} -> {:?}", self.params);
        Ok(())
    }

    /// Uniforms for the current camera and parameters.
    pub fn uniforms(&self, camera: &Camera) -> RayMarchUniforms {
        RayMarchUniforms::new(
            self.transform.to_matrix(),
            camera.view_projection_matrix(),
            self.transform.world_to_local(camera.position),
            &self.params,
            self.frame,
        )
    }

    /// Draws one frame into the engine's current target and presents it.
    ///
    /// `dt` is the time since the previous frame and only drives the spin.
    pub fn render(&mut self, engine: &RenderEngine, dt: f32) -> Result<()> {
        self.ensure(Stage::Rendering)?;
        let target = engine.begin_frame().map_err(render_error)?;
        self.render_into(engine, &target, dt)?;
        target.present();
        Ok(())
    }

    /// Draws one frame into an already acquired target without presenting.
    pub fn render_into(&mut self, engine: &RenderEngine, target: &FrameTarget, dt: f32) -> Result<()> {
        self.ensure(Stage::Rendering)?;
        let gpu = self
            .gpu
            .as_ref()
            .ok_or_else(|| CumulusError::RenderError("GPU volume missing".into()))?;

        self.transform.spin(dt);
        let uniforms = self.uniforms(&engine.camera);
        gpu.render(
            &engine.device,
            &engine.queue,
            target.view(),
            &uniforms,
            self.options.background_color,
        );

        self.stage.advance(Stage::Rendering)?;
        self.frame = self.frame.wrapping_add(1);
        Ok(())
    }

    /// Renders the same framing on the CPU, generating the field if needed.
    ///
    /// Available until the field has been moved to the GPU.
    pub fn render_software(&mut self, camera: &Camera, width: u32, height: u32) -> Result<RgbaImage> {
        if self.stage == Stage::Uninitialized {
            self.generate_field()?;
        }
        let field = self.field.clone().ok_or_else(|| {
            CumulusError::RenderError(format!("no CPU field in stage {:?}", self.stage))
        })?;

        let view = SoftwareView {
            model: self.transform.to_matrix(),
            view_proj: camera.view_projection_matrix(),
            camera_position: camera.position,
            background: self.options.background_color,
            frame: self.frame,
        };
        let start = Instant::now();
        let image = software::render(
            &VolumeSampler::new(field),
            &self.params,
            self.options.features,
            &view,
            width,
            height,
        );
        log::debug!("software frame took {:?}", start.elapsed());
        Ok(image)
    }

    /// Releases the texture, pipeline and buffers together. Idempotent.
    pub fn dispose(&mut self) {
        if self.stage == Stage::Disposed {
            return;
        }
        if self.stage.has_gpu_resources() {
            if let Some(gpu) = self.gpu.take() {
                gpu.destroy();
                log::debug!("released volume texture, pipeline and buffers");
            }
        }
        self.field = None;
        // Every live stage may move to Disposed.
        let _ = self.stage.advance(Stage::Disposed);
        log::info!("volume renderer disposed after {} frames", self.frame);
    }

    fn ensure(&self, next: Stage) -> Result<()> {
        if self.stage.can_advance_to(next) {
            Ok(())
        } else {
            Err(CumulusError::InvalidTransition {
                from: self.stage,
                to: next,
            })
        }
    }
}

impl Drop for VolumeRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_core::NoiseParameters;

    fn small_options() -> Options {
        Options {
            noise: NoiseParameters::cloud(16),
            ..Options::cloud()
        }
    }

    #[test]
    fn test_generate_then_dispose() {
        let mut renderer = VolumeRenderer::new(small_options());
        assert_eq!(renderer.stage(), Stage::Uninitialized);
        assert_eq!(renderer.generate_field().unwrap().resolution(), 16);
        assert_eq!(renderer.stage(), Stage::FieldGenerated);
        renderer.dispose();
        assert_eq!(renderer.stage(), Stage::Disposed);
        assert!(renderer.field().is_none());
    }

    #[test]
    fn test_generate_twice_is_rejected() {
        let mut renderer = VolumeRenderer::new(small_options());
        renderer.generate_field().unwrap();
        assert!(matches!(
            renderer.generate_field(),
            Err(CumulusError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_apply_clamps_and_takes_effect() {
        let mut renderer = VolumeRenderer::new(small_options());
        renderer.apply(ParamUpdate::Threshold(2.0)).unwrap();
        renderer.apply(ParamUpdate::Steps(0)).unwrap();
        renderer.apply(ParamUpdate::Opacity(0.3)).unwrap();
        renderer.apply(ParamUpdate::Opacity(0.4)).unwrap();
        assert_eq!(renderer.params().threshold, 1.0);
        assert_eq!(renderer.params().steps, 1);
        assert_eq!(renderer.params().opacity, 0.4);

        let uniforms = renderer.uniforms(&Camera::default());
        assert_eq!(uniforms.threshold, 1.0);
        assert_eq!(uniforms.opacity, 0.4);
    }

    #[test]
    fn test_apply_after_dispose_fails() {
        let mut renderer = VolumeRenderer::new(small_options());
        renderer.dispose();
        assert!(renderer.apply(ParamUpdate::Range(0.2)).is_err());
        assert!(renderer.generate_field().is_err());
    }

    #[test]
    fn test_uniforms_carry_local_camera() {
        let mut renderer = VolumeRenderer::new(small_options());
        renderer.transform_mut().translation = glam::Vec3::new(1.0, 0.0, 0.0);
        let camera = Camera::default();
        let uniforms = renderer.uniforms(&camera);
        let expected = camera.position - glam::Vec3::new(1.0, 0.0, 0.0);
        assert!((glam::Vec3::from(uniforms.camera_local) - expected).length() < 1e-5);
    }

    #[test]
    fn test_software_render_generates_field() {
        let mut renderer = VolumeRenderer::new(small_options());
        let image = renderer
            .render_software(&Camera::default(), 12, 8)
            .unwrap();
        assert_eq!(image.pixels.len(), 12 * 8 * 4);
        assert_eq!(renderer.stage(), Stage::FieldGenerated);
    }
}
