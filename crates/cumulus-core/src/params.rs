//! Live ray-marching parameters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameters read by the ray marcher every frame.
///
/// Fields are public so hosts can fill them directly; in that case keeping
/// `threshold`, `opacity` and `range` in `[0, 1]` and `steps` positive is the
/// host's job. The setters and [`RayMarchParams::apply`] clamp for you.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayMarchParams {
    /// Densities at or below this value contribute nothing.
    pub threshold: f32,
    /// Opacity gained per step by a fully dense sample.
    pub opacity: f32,
    /// Width of the soft edge above `threshold`. Zero gives a hard cutoff.
    pub range: f32,
    /// Number of samples along the segment inside the box.
    pub steps: u32,
    /// Color of the medium.
    pub base_color: Vec3,
}

impl Default for RayMarchParams {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            opacity: 0.25,
            range: 0.1,
            steps: 100,
            base_color: Vec3::new(0.478, 0.592, 0.729),
        }
    }
}

impl RayMarchParams {
    /// Sets the threshold, clamped to `[0, 1]`.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_unit(threshold);
    }

    /// Sets the per-step opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_unit(opacity);
    }

    /// Sets the soft-edge width, clamped to `[0, 1]`.
    pub fn set_range(&mut self, range: f32) {
        self.range = clamp_unit(range);
    }

    /// Sets the step count, never below one.
    pub fn set_steps(&mut self, steps: u32) {
        self.steps = steps.max(1);
    }

    /// Sets the base color, each channel clamped to `[0, 1]`.
    pub fn set_base_color(&mut self, color: Vec3) {
        self.base_color = color.clamp(Vec3::ZERO, Vec3::ONE);
    }

    /// Applies a control change. The newest value simply replaces the old one.
    pub fn apply(&mut self, update: ParamUpdate) {
        match update {
            ParamUpdate::Threshold(v) => self.set_threshold(v),
            ParamUpdate::Opacity(v) => self.set_opacity(v),
            ParamUpdate::Range(v) => self.set_range(v),
            ParamUpdate::Steps(v) => self.set_steps(v),
            ParamUpdate::BaseColor(c) => self.set_base_color(c),
        }
    }

    /// Returns a copy with every field brought into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let mut out = self;
        out.set_threshold(self.threshold);
        out.set_opacity(self.opacity);
        out.set_range(self.range);
        out.set_steps(self.steps);
        out.set_base_color(self.base_color);
        out
    }
}

/// A single change coming from a control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamUpdate {
    Threshold(f32),
    Opacity(f32),
    Range(f32),
    Steps(u32),
    BaseColor(Vec3),
}

/// Optional ray-march features. Each combination is its own shader variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ShadingFeatures {
    /// Darken samples by the local density gradient (soft self-shadowing).
    pub shaded: bool,
    /// Offset the first sample per pixel and per frame to trade banding for noise.
    pub jitter: bool,
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
