use super::{
    ActiveEventLoop, App, ApplicationHandler, Arc, ElementState, FutureExt, KeyCode, LogicalSize,
    MouseButton, MouseScrollDelta, PhysicalKey, RenderEngine, Window, WindowEvent, WindowId,
};
use cumulus_core::CumulusError;

/// Orbit radians per pixel of mouse drag.
const ORBIT_SPEED: f32 = 0.01;
/// Zoom distance per wheel line.
const ZOOM_PER_LINE: f32 = 0.1;

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("cumulus")
            .with_inner_size(LogicalSize::new(1024, 768));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(CumulusError::RenderError(format!("failed to create window: {err}")));
                event_loop.exit();
                return;
            }
        };

        let resolution = self.renderer.options().noise.resolution;
        let engine = match RenderEngine::new_windowed(window.clone(), resolution).block_on() {
            Ok(engine) => engine,
            Err(err) => {
                self.fail(CumulusError::RenderError(err.to_string()));
                event_loop.exit();
                return;
            }
        };

        if let Err(err) = self.renderer.initialize(&engine) {
            self.fail(err);
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if !self.close_requested {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.left_mouse_down = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.0;
                let delta_y = position.y - self.mouse_pos.1;
                self.mouse_pos = (position.x, position.y);

                if self.left_mouse_down {
                    if let Some(engine) = &mut self.engine {
                        engine
                            .camera
                            .orbit(delta_x as f32 * ORBIT_SPEED, delta_y as f32 * ORBIT_SPEED);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                if let Some(engine) = &mut self.engine {
                    engine.camera.zoom(lines * ZOOM_PER_LINE);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                match key {
                    KeyCode::Escape => self.close_requested = true,
                    KeyCode::KeyC => {
                        if let Some(engine) = &mut self.engine {
                            let (min, max) = self.renderer.transform().world_bounds();
                            engine.camera.look_at_box(min, max);
                        }
                    }
                    KeyCode::Space => {
                        self.spin_paused = !self.spin_paused;
                        log::info!("spin {}", if self.spin_paused { "paused" } else { "resumed" });
                    }
                    _ => {
                        if let Some(update) = App::key_update(self.renderer.params(), key) {
                            if let Err(err) = self.renderer.apply(update) {
                                self.fail(err);
                            }
                        }
                    }
                }
            }
            _ => {}
        }

        if self.close_requested {
            self.renderer.dispose();
            event_loop.exit();
        }
    }
}
