//! Shader management.
//!
//! The ray-march shader body never changes. Variants are made by prepending a
//! header of compile-time constants, so every renderer compiles its own module.

use std::fmt::Write as _;

use cumulus_core::ShadingFeatures;

use crate::error::{RenderError, RenderResult};

/// The ray-march shader body. It expects `SHADED` and `JITTER` to be defined.
pub const RAYMARCH_SOURCE: &str = include_str!("shaders/raymarch.wgsl");

/// Builder for shader modules made of a define header and a body.
pub struct ShaderBuilder {
    body: String,
    defines: Vec<(String, String)>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a builder around a WGSL body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            defines: Vec::new(),
            label: None,
        }
    }

    /// Builder for the ray-march shader with `features` baked in.
    #[must_use]
    pub fn raymarch(features: ShadingFeatures) -> Self {
        Self::new(RAYMARCH_SOURCE)
            .with_flag("SHADED", features.shaded)
            .with_flag("JITTER", features.jitter)
            .with_label(variant_label(features))
    }

    /// Declares `const NAME: bool = value;` ahead of the body.
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.defines.push((name.into(), format!("bool = {value}")));
        self
    }

    /// Sets the shader label for debugging.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Full WGSL text: header followed by the untouched body.
    pub fn source(&self) -> RenderResult<String> {
        let mut source = String::new();
        for (name, decl) in &self.defines {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(RenderError::ShaderCompilationFailed(format!(
                    "invalid constant name {name:?}"
                )));
            }
            let _ = writeln!(source, "const {name}: {decl};");
        }
        source.push('\n');
        source.push_str(&self.body);
        Ok(source)
    }

    /// Compiles the module, reporting validation failures as errors.
    pub fn build_module(self, device: &wgpu::Device) -> RenderResult<wgpu::ShaderModule> {
        let source = self.source()?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: self.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilationFailed(err.to_string()));
        }

        log::debug!(
            "compiled shader {}",
            self.label.as_deref().unwrap_or("<unnamed>")
        );
        Ok(module)
    }
}

fn variant_label(features: ShadingFeatures) -> String {
    let shading = if features.shaded { "shaded" } else { "flat" };
    let jitter = if features.jitter { "jittered" } else { "centered" };
    format!("raymarch ({shading}, {jitter})")
}
