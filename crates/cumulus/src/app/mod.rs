//! Application window and event loop management.

mod input;

pub(super) use std::sync::Arc;
use std::time::Instant;

pub(super) use pollster::FutureExt;
pub(super) use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use cumulus_core::{CumulusError, Options, ParamUpdate, RayMarchParams, Result, Stage};
pub(super) use cumulus_render::{RenderEngine, RenderError};

use crate::orchestrator::VolumeRenderer;

/// Threshold change per key press.
const THRESHOLD_STEP: f32 = 0.01;
/// Opacity change per key press.
const OPACITY_STEP: f32 = 0.05;
/// Range change per key press.
const RANGE_STEP: f32 = 0.01;
/// Step count change per key press.
const STEPS_STEP: i64 = 10;

/// The windowed application state.
pub struct App {
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) renderer: VolumeRenderer,
    pub(super) close_requested: bool,
    pub(super) error: Option<CumulusError>,
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    pub(super) spin_paused: bool,
    pub(super) last_frame_time: Option<Instant>,
}

impl App {
    /// Creates a new application.
    pub fn new(options: Options) -> Self {
        Self {
            window: None,
            engine: None,
            renderer: VolumeRenderer::new(options),
            close_requested: false,
            error: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            spin_paused: false,
            last_frame_time: None,
        }
    }

    /// Records a fatal error and asks the loop to stop.
    pub(super) fn fail(&mut self, err: CumulusError) {
        log::error!("{err}");
        self.error = Some(err);
        self.close_requested = true;
    }

    /// Whether frames may still be drawn. False once the renderer is disposed,
    /// which a redraw queued behind a close request can observe.
    pub(super) fn accepts_frames(&self) -> bool {
        self.renderer.stage() != Stage::Disposed
    }

    /// Draws one frame, recovering from a lost or outdated surface.
    pub(super) fn render(&mut self) {
        if !self.accepts_frames() {
            return;
        }
        let Some(engine) = &self.engine else {
            return;
        };

        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame_time = Some(now);
        let dt = if self.spin_paused { 0.0 } else { dt };

        let target = match engine.begin_frame() {
            Ok(target) => target,
            Err(RenderError::SurfaceLost | RenderError::SurfaceOutdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                engine.reconfigure();
                return;
            }
            Err(err) => {
                self.fail(CumulusError::RenderError(err.to_string()));
                return;
            }
        };

        match self.renderer.render_into(engine, &target, dt) {
            Ok(()) => target.present(),
            Err(err) => self.fail(err),
        }
    }

    /// Maps a key press to a control change.
    pub(super) fn key_update(params: &RayMarchParams, key: KeyCode) -> Option<ParamUpdate> {
        let update = match key {
            KeyCode::KeyT => ParamUpdate::Threshold(params.threshold + THRESHOLD_STEP),
            KeyCode::KeyG => ParamUpdate::Threshold(params.threshold - THRESHOLD_STEP),
            KeyCode::KeyO => ParamUpdate::Opacity(params.opacity + OPACITY_STEP),
            KeyCode::KeyL => ParamUpdate::Opacity(params.opacity - OPACITY_STEP),
            KeyCode::KeyR => ParamUpdate::Range(params.range + RANGE_STEP),
            KeyCode::KeyF => ParamUpdate::Range(params.range - RANGE_STEP),
            KeyCode::BracketRight | KeyCode::BracketLeft => {
                let delta = if key == KeyCode::BracketRight {
                    STEPS_STEP
                } else {
                    -STEPS_STEP
                };
                let steps = (i64::from(params.steps) + delta).clamp(1, i64::from(u32::MAX));
                ParamUpdate::Steps(u32::try_from(steps).unwrap_or(1))
            }
            _ => return None,
        };
        Some(update)
    }
}

/// Runs the windowed application until the window is closed.
pub fn run_app(options: Options) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| CumulusError::RenderError(format!("event loop: {e}")))?;
    let mut app = App::new(options);

    event_loop
        .run_app(&mut app)
        .map_err(|e| CumulusError::RenderError(format!("event loop: {e}")))?;

    app.renderer.dispose();
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
