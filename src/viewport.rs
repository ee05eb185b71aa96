use log::debug;

use crate::scene::{CameraId, Mesh, MeshId, PerspectiveCamera, Scene};

/// Logical window size plus the device pixel ratio of the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl ViewportState {
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size of the backing surface in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            scale_dimension(self.width, self.pixel_ratio),
            scale_dimension(self.height, self.pixel_ratio),
        )
    }
}

pub(crate) fn scale_dimension(value: u32, ratio: f64) -> u32 {
    ((value as f64 * ratio).round() as u32).max(1)
}

/// Everything the resize handler and the frame callback touch.
#[derive(Debug, Clone)]
pub struct AppState {
    pub scene: Scene,
    pub camera: CameraId,
    pub mesh: MeshId,
    pub viewport: ViewportState,
}

impl AppState {
    pub fn camera(&self) -> &PerspectiveCamera {
        self.scene.camera(self.camera)
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        self.scene.camera_mut(self.camera)
    }

    pub fn mesh(&self) -> &Mesh {
        self.scene.mesh(self.mesh)
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        self.scene.mesh_mut(self.mesh)
    }
}

/// Drawable target the controller sizes and renders into.
pub trait RenderSurface {
    type Error;

    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Resizes the surface to `width` x `height` logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), Self::Error>;
}

/// Per-frame update run before each draw.
pub type FrameCallback = Box<dyn FnMut(&mut AppState)>;

/// Frame callback spinning the mesh by `increment` radians around Y.
pub fn spin(increment: f32) -> FrameCallback {
    Box::new(move |state: &mut AppState| state.mesh_mut().rotate_y(increment))
}

/// Owns the render surface and drives resize handling and the frame tick.
///
/// The controller never runs a loop itself; the host calls [`tick`] once per
/// display refresh.
///
/// [`tick`]: ViewportController::tick
pub struct ViewportController<S: RenderSurface> {
    surface: S,
    state: AppState,
    frame: Option<FrameCallback>,
}

impl<S: RenderSurface> ViewportController<S> {
    /// Sizes `surface` to the viewport and installs the spin callback.
    pub fn new(mut surface: S, state: AppState, spin_per_frame: f32) -> Self {
        surface.set_pixel_ratio(state.viewport.pixel_ratio);
        surface.set_size(state.viewport.width, state.viewport.height);
        Self {
            surface,
            state,
            frame: Some(spin(spin_per_frame)),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        self.state.camera_mut()
    }

    pub fn viewport(&self) -> ViewportState {
        self.state.viewport
    }

    /// Applies a new logical window size. Zero sized windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("resize to {width}x{height}");
        self.state.viewport.width = width;
        self.state.viewport.height = height;
        let aspect = self.state.viewport.aspect();
        let camera = self.state.camera_mut();
        camera.aspect = aspect;
        camera.update_projection_matrix();
        self.surface.set_size(width, height);
    }

    /// Re-applies the pixel ratio after a display scale change.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        if !(ratio.is_finite() && ratio > 0.0) {
            return;
        }
        self.state.viewport.pixel_ratio = ratio;
        self.surface.set_pixel_ratio(ratio);
        self.surface
            .set_size(self.state.viewport.width, self.state.viewport.height);
    }

    /// Replaces the frame callback; `None` halts the animation.
    pub fn set_animation_loop(&mut self, callback: Option<FrameCallback>) {
        self.frame = callback;
    }

    pub fn is_animating(&self) -> bool {
        self.frame.is_some()
    }

    /// Runs the frame callback, then draws the scene from the camera.
    pub fn tick(&mut self) -> Result<(), S::Error> {
        let Some(frame) = self.frame.as_mut() else {
            return Ok(());
        };
        frame(&mut self.state);
        let camera = self.state.scene.camera(self.state.camera);
        self.surface.render(&self.state.scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::assembly::assemble_scene;
    use crate::config::AppConfig;
    use crate::render::HeadlessSurface;

    fn controller(width: u32, height: u32) -> ViewportController<HeadlessSurface> {
        let state =
            assemble_scene(&AppConfig::default(), ViewportState::new(width, height, 2.0)).unwrap();
        ViewportController::new(HeadlessSurface::default(), state, 0.01)
    }

    #[test]
    fn construction_sizes_the_surface() {
        let controller = controller(800, 600);
        assert_eq!(controller.surface().pixel_ratio(), 2.0);
        assert_eq!(controller.surface().physical_size(), (1600, 1200));
    }

    #[test]
    fn resize_updates_aspect_projection_and_surface() {
        let mut controller = controller(800, 600);
        let geometry = controller.state().mesh().geometry().clone();
        let projection = controller.state().camera().projection_matrix();

        controller.resize(1000, 250);

        let camera = controller.state().camera();
        assert_eq!(camera.aspect, 1000.0 / 250.0);
        assert_ne!(camera.projection_matrix(), projection);
        assert_eq!(controller.surface().size(), (1000, 250));
        assert_eq!(controller.state().mesh().geometry(), &geometry);

        let after_first = controller.state().camera().clone();
        controller.resize(1000, 250);
        assert_eq!(controller.state().camera(), &after_first);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut controller = controller(800, 600);
        controller.resize(0, 600);
        assert_eq!(controller.viewport().width, 800);
        assert_eq!(controller.surface().size(), (800, 600));
    }

    #[test]
    fn ticks_accumulate_rotation_and_draw() {
        let mut controller = controller(800, 600);
        for _ in 0..100 {
            controller.tick().unwrap();
        }
        let (axis, angle) = controller.state().mesh().rotation.to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-4));
        assert!((angle - 1.0).abs() < 1e-3, "angle was {angle}");
        assert_eq!(controller.surface().frames(), 100);
    }

    #[test]
    fn clearing_the_loop_halts_updates_and_draws() {
        let mut controller = controller(800, 600);
        controller.tick().unwrap();
        controller.set_animation_loop(None);
        assert!(!controller.is_animating());
        let rotation = controller.state().mesh().rotation;
        controller.tick().unwrap();
        assert_eq!(controller.state().mesh().rotation, rotation);
        assert_eq!(controller.surface().frames(), 1);

        controller.set_animation_loop(Some(spin(0.5)));
        controller.tick().unwrap();
        assert_eq!(controller.surface().frames(), 2);
    }

    #[test]
    fn pixel_ratio_change_rescales_surface() {
        let mut controller = controller(800, 600);
        controller.set_pixel_ratio(1.5);
        assert_eq!(controller.surface().physical_size(), (1200, 900));
        controller.set_pixel_ratio(0.0);
        assert_eq!(controller.viewport().pixel_ratio, 1.5);
    }
}
