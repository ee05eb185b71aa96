use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec2;
use log::{error, info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, Touch, TouchPhase,
    WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::assembly::assemble_scene;
use crate::config::AppConfig;
use crate::input::{MouseButton, PointerEvent};
use crate::orbit::OrbitControls;
use crate::render::{HeadlessSurface, Renderer};
use crate::scene::Node;
use crate::viewport::{RenderSurface, ViewportController, ViewportState};

/// Pixels of a precise scroll gesture that count as one wheel line.
const PIXELS_PER_LINE: f64 = 50.0;

/// Builds the scene and runs `frames` ticks without opening a window.
pub fn run_headless(config: &AppConfig, frames: u32) -> Result<ViewportController<HeadlessSurface>> {
    let viewport = ViewportState::new(config.window.width, config.window.height, 1.0);
    let state = assemble_scene(config, viewport).context("failed to assemble scene")?;
    let mut controller =
        ViewportController::new(HeadlessSurface::default(), state, config.spin_per_frame);
    for _ in 0..frames {
        if let Err(never) = controller.tick() {
            match never {}
        }
    }
    Ok(controller)
}

pub fn print_summary<S: RenderSurface>(config: &AppConfig, controller: &ViewportController<S>) {
    let state = controller.state();
    let children = state.scene.children();
    println!(
        "Loaded {} scene with {} nodes",
        config.shape.kind,
        children.len()
    );
    for child in children {
        println!(" - {}", child.name());
    }

    let mesh = state.mesh();
    let geometry = mesh.geometry();
    println!(
        "Mesh {}: {} vertices, {} triangles",
        mesh.name(),
        geometry.vertex_count(),
        geometry.triangle_count()
    );
    let viewport = state.viewport;
    println!(
        "Viewport {}x{} (aspect {:.3})",
        viewport.width,
        viewport.height,
        state.camera().aspect
    );
    let (_, angle) = mesh.rotation.to_axis_angle();
    println!("Final rotation: {angle:.2} rad");
}

/// Opens a window and renders until it is closed or `frame_limit` frames
/// have been drawn.
pub fn run_interactive(config: AppConfig, frame_limit: Option<u32>) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ShapeApp::new(config, frame_limit);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    if let Some(controller) = &app.controller {
        print_summary(&app.config, controller);
    }
    Ok(())
}

/// Raised when no window can be created, so callers can fall back to a
/// headless run.
#[derive(Debug)]
pub struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct ShapeApp {
    config: AppConfig,
    frame_limit: Option<u32>,
    frames: u32,
    controller: Option<ViewportController<Renderer>>,
    orbit: Option<OrbitControls>,
    touch: Option<u64>,
    last_error: Option<anyhow::Error>,
}

impl ShapeApp {
    fn new(config: AppConfig, frame_limit: Option<u32>) -> Self {
        Self {
            config,
            frame_limit,
            frames: 0,
            controller: None,
            orbit: None,
            touch: None,
            last_error: None,
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let scale_factor = window.scale_factor();
        let size: LogicalSize<u32> = window.inner_size().to_logical(scale_factor);
        let renderer = block_on(Renderer::new(Arc::clone(&window)))
            .context("failed to initialize renderer")?;
        let state = assemble_scene(
            &self.config,
            ViewportState::new(size.width, size.height, scale_factor),
        )
        .context("failed to assemble scene")?;

        let orbit = OrbitControls::attach(state.camera());
        self.controller = Some(ViewportController::new(
            renderer,
            state,
            self.config.spin_per_frame,
        ));
        self.orbit = Some(orbit);
        info!(
            "window ready at {}x{} (scale factor {scale_factor})",
            size.width, size.height
        );
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn pointer(&mut self, event: PointerEvent) {
        let (Some(controller), Some(orbit)) = (self.controller.as_mut(), self.orbit.as_mut())
        else {
            return;
        };
        let height = controller.viewport().height;
        if orbit.handle_event(&event, controller.state().camera(), height) {
            orbit.update(controller.camera_mut());
        }
    }

    fn logical_position(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let ratio = self
            .controller
            .as_ref()
            .map_or(1.0, |controller| controller.viewport().pixel_ratio);
        let logical = position.to_logical::<f64>(ratio);
        Vec2::new(logical.x as f32, logical.y as f32)
    }

    fn handle_touch(&mut self, touch: Touch) {
        let position = self.logical_position(touch.location);
        let event = match touch.phase {
            TouchPhase::Started if self.touch.is_none() => {
                self.touch = Some(touch.id);
                PointerEvent::Down {
                    button: MouseButton::LEFT,
                    position,
                }
            }
            TouchPhase::Moved if self.touch == Some(touch.id) => PointerEvent::Move { position },
            TouchPhase::Ended | TouchPhase::Cancelled if self.touch == Some(touch.id) => {
                self.touch = None;
                PointerEvent::Up {
                    button: MouseButton::LEFT,
                    position,
                }
            }
            _ => return,
        };
        self.pointer(event);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        match controller.tick() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated; skipping frame");
                controller.surface_mut().reconfigure();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
            }
            Err(err) => {
                let err = anyhow::Error::new(err).context("failed to render frame");
                self.fail(event_loop, err);
                return;
            }
        }

        self.frames += 1;
        if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
            event_loop.exit();
        }
    }
}

/// Extra buttons are numbered after `Back` and `Forward` so none of them alias.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => value.saturating_add(5).min(u8::MAX as u16) as u8,
    };
    MouseButton::new(index)
}

impl ApplicationHandler for ShapeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.controller.is_some() {
            return;
        }
        if let Err(err) = self.initialize(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if window_id != controller.surface().window_id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let ratio = controller.viewport().pixel_ratio;
                let logical: LogicalSize<u32> = size.to_logical(ratio);
                controller.resize(logical.width, logical.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                controller.set_pixel_ratio(scale_factor);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(button);
                let position = self
                    .orbit
                    .as_ref()
                    .map_or(Vec2::ZERO, |orbit| orbit.pointer_position());
                let event = match state {
                    ElementState::Pressed => PointerEvent::Down { button, position },
                    ElementState::Released => PointerEvent::Up { button, position },
                };
                self.pointer(event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = self.logical_position(position);
                self.pointer(PointerEvent::Move { position });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(offset) => (offset.y / PIXELS_PER_LINE) as f32,
                };
                self.pointer(PointerEvent::Wheel { delta });
            }
            WindowEvent::Touch(touch) => self.handle_touch(touch),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(controller) = &self.controller {
            controller.surface().window().request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::ShapeKind;

    #[test]
    fn headless_run_spins_the_mesh() {
        let controller = run_headless(&AppConfig::default(), 100).unwrap();
        assert_eq!(controller.surface().frames(), 100);
        let (axis, angle) = controller.state().mesh().rotation.to_axis_angle();
        assert!(axis.abs_diff_eq(glam::Vec3::Y, 1e-4));
        assert!((angle - 1.0).abs() < 1e-3);
    }

    #[test]
    fn headless_run_without_frames_leaves_mesh_at_rest() {
        let mut config = AppConfig::default();
        config.shape.kind = ShapeKind::Hexagon;
        let controller = run_headless(&config, 0).unwrap();
        assert_eq!(controller.surface().frames(), 0);
        assert_eq!(controller.state().mesh().rotation, glam::Quat::IDENTITY);
        assert_eq!(controller.state().mesh().name(), "Hexagon");
    }

    #[test]
    fn headless_run_reports_invalid_shapes() {
        let mut config = AppConfig::default();
        config.shape.points = 2;
        let Err(err) = run_headless(&config, 1) else {
            panic!("a two point star must not assemble");
        };
        assert!(format!("{err:#}").contains("at least 3"));
    }

    #[test]
    fn extra_mouse_buttons_do_not_alias_named_ones() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::LEFT);
        assert_eq!(map_mouse_button(WinitMouseButton::Right), MouseButton::RIGHT);
        assert_eq!(map_mouse_button(WinitMouseButton::Middle), MouseButton::MIDDLE);
        let back = map_mouse_button(WinitMouseButton::Back);
        let forward = map_mouse_button(WinitMouseButton::Forward);
        for value in [0, 1, 2, 3, 4] {
            let other = map_mouse_button(WinitMouseButton::Other(value));
            assert_ne!(other, back);
            assert_ne!(other, forward);
            assert!(other.index() > 4);
        }
        assert_eq!(map_mouse_button(WinitMouseButton::Other(3)).index(), 8);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(u16::MAX)).index(), u8::MAX);
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(Box::new("no display")), "no display");
        assert_eq!(panic_message(Box::new(String::from("boom"))), "boom");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }
}
