//! Orbit camera controls: rotate around a target, dolly towards it and pan
//! the target in the view plane.
//!
//! Left drag (or a single touch) rotates, right drag pans, middle drag and the
//! wheel dolly. Deltas accumulate while events arrive and are applied to the
//! camera by [`OrbitControls::update`].

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::input::{MouseButton, PointerEvent, PointerState};
use crate::scene::PerspectiveCamera;

const POLAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    None,
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pointer: PointerState,
    gesture: Gesture,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    /// Binds the controls to `camera`, orbiting around its current target.
    pub fn attach(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            pointer: PointerState::new(),
            gesture: Gesture::None,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Feeds one pointer event. `viewport_height` is the logical height of
    /// the render surface, which scales rotation and panning.
    ///
    /// Returns `true` when the camera needs an [`update`](Self::update).
    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        camera: &PerspectiveCamera,
        viewport_height: u32,
    ) -> bool {
        let height = viewport_height.max(1) as f32;
        let delta = self.pointer.apply(event);
        match *event {
            PointerEvent::Down { button, .. } => {
                self.gesture = match button {
                    MouseButton::LEFT if self.enable_rotate => Gesture::Rotate,
                    MouseButton::MIDDLE if self.enable_zoom => Gesture::Dolly,
                    MouseButton::RIGHT if self.enable_pan => Gesture::Pan,
                    _ => Gesture::None,
                };
                false
            }
            PointerEvent::Up { .. } => {
                if !self.pointer.any_button_down() {
                    self.gesture = Gesture::None;
                }
                false
            }
            PointerEvent::Move { .. } => match self.gesture {
                Gesture::None => false,
                Gesture::Rotate => {
                    self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                    self.rotate_up(TAU * delta.y / height * self.rotate_speed);
                    true
                }
                Gesture::Dolly => {
                    if delta.y > 0.0 {
                        self.dolly(1.0 / self.zoom_scale(1.0));
                    } else if delta.y < 0.0 {
                        self.dolly(self.zoom_scale(1.0));
                    }
                    delta.y != 0.0
                }
                Gesture::Pan => {
                    self.pan(delta * self.pan_speed, camera, height);
                    true
                }
            },
            PointerEvent::Wheel { delta } => {
                if !self.enable_zoom || delta == 0.0 {
                    return false;
                }
                self.dolly(self.zoom_scale(delta));
                true
            }
        }
    }

    /// Last pointer position seen by the controls.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer.position()
    }

    /// Applies accumulated rotation, dolly and pan to `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        theta += self.delta_theta;
        phi = (phi + self.delta_phi)
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset;
        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    fn zoom_scale(&self, steps: f32) -> f32 {
        0.95f32.powf(self.zoom_speed * steps)
    }

    fn dolly(&mut self, factor: f32) {
        self.scale *= factor;
    }

    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, height: f32) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        self.pan_offset -= right * (2.0 * delta.x * target_distance / height);
        self.pan_offset += up * (2.0 * delta.y * target_distance / height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 0.0, 4.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn drag(controls: &mut OrbitControls, camera: &PerspectiveCamera, button: MouseButton, by: Vec2) {
        let start = Vec2::new(100.0, 100.0);
        controls.handle_event(&PointerEvent::Down { button, position: start }, camera, 400);
        controls.handle_event(&PointerEvent::Move { position: start + by }, camera, 400);
        controls.handle_event(&PointerEvent::Up { button, position: start + by }, camera, 400);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut camera = camera();
        let mut controls = OrbitControls::attach(&camera);
        drag(&mut controls, &camera, MouseButton::LEFT, Vec2::new(100.0, 0.0));
        controls.update(&mut camera);

        assert!((camera.position.length() - 4.0).abs() < 1e-4);
        // A quarter of the viewport height turns the camera by a quarter turn.
        assert!(camera.position.abs_diff_eq(Vec3::new(-4.0, 0.0, 0.0), 1e-3));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut camera = camera();
        let mut controls = OrbitControls::attach(&camera);
        drag(&mut controls, &camera, MouseButton::LEFT, Vec2::new(0.0, 1000.0));
        controls.update(&mut camera);
        assert!(camera.position.y > 3.99);
        assert!(camera.position.z >= 0.0);
    }

    #[test]
    fn wheel_dollies_within_limits() {
        let mut camera = camera();
        let mut controls = OrbitControls::attach(&camera);
        assert!(controls.handle_event(&PointerEvent::Wheel { delta: 1.0 }, &camera, 400));
        controls.update(&mut camera);
        assert!((camera.position.z - 3.8).abs() < 1e-4);

        controls.min_distance = 2.0;
        controls.handle_event(&PointerEvent::Wheel { delta: 100.0 }, &camera, 400);
        controls.update(&mut camera);
        assert!((camera.position.length() - 2.0).abs() < 1e-4);

        controls.enable_zoom = false;
        assert!(!controls.handle_event(&PointerEvent::Wheel { delta: 1.0 }, &camera, 400));
    }

    #[test]
    fn right_drag_pans_target_and_camera_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::attach(&camera);
        drag(&mut controls, &camera, MouseButton::RIGHT, Vec2::new(50.0, 0.0));
        controls.update(&mut camera);

        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-5);
        assert_eq!(camera.target, controls.target);
        assert!(((camera.position - camera.target).length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn moves_without_a_pressed_button_do_nothing() {
        let camera = camera();
        let mut controls = OrbitControls::attach(&camera);
        let changed = controls.handle_event(
            &PointerEvent::Move {
                position: Vec2::new(30.0, 30.0),
            },
            &camera,
            400,
        );
        assert!(!changed);
    }
}
