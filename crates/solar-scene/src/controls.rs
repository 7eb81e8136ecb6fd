//! Orbit controls: pointer drag orbits the camera around a target, the wheel
//! dollies toward or away from it, and motion eases out with damping.
//!
//! Input only accumulates a pending spherical delta. [`OrbitControls::update`],
//! called once per frame, applies a fraction of it to the camera and decays
//! the remainder, so a drag keeps gliding for a few frames after release.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use solar_config::ControlsConfig;
use solar_input::PointerState;
use solar_render::Camera;

/// Keeps the polar angle off the poles so `look_at` stays well defined.
const POLAR_EPSILON: f32 = 1e-6;
/// Base dolly factor per wheel line.
const ZOOM_BASE: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending (theta, phi) change in radians.
    pending: Vec2,
    /// Pending radius multiplier.
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig, target: Vec3) -> Self {
        Self {
            target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance.max(config.min_distance),
            pending: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Spin around the vertical axis.
    pub fn rotate_left(&mut self, angle: f32) {
        self.pending.x -= angle;
    }

    /// Tilt toward the poles.
    pub fn rotate_up(&mut self, angle: f32) {
        self.pending.y -= angle;
    }

    /// A drag of `delta` logical pixels on a viewport `viewport_height` tall.
    /// Dragging the full height turns the camera once around.
    pub fn drag(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 || delta == Vec2::ZERO {
            return;
        }
        self.rotate_left(TAU * delta.x / viewport_height * self.rotate_speed);
        self.rotate_up(TAU * delta.y / viewport_height * self.rotate_speed);
    }

    /// Positive lines (wheel up) move the camera closer.
    pub fn scroll(&mut self, lines: f32) {
        if lines == 0.0 || !lines.is_finite() {
            return;
        }
        self.scale *= ZOOM_BASE.powf(self.zoom_speed * lines);
    }

    /// Consume this frame's pointer drag and wheel input.
    pub fn handle_pointer(&mut self, pointer: &mut PointerState, viewport_height: f32) {
        self.drag(pointer.drag_delta(), viewport_height);
        self.scroll(pointer.scroll_lines());
        pointer.clear_transients();
    }

    /// Whether damped motion is still settling.
    pub fn is_moving(&self) -> bool {
        self.pending.length_squared() > 1e-12 || (self.scale - 1.0).abs() > 1e-6
    }

    /// Move `camera` by the pending delta and re-aim it at the target.
    /// Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        let applied = if self.enable_damping {
            self.pending * self.damping_factor
        } else {
            self.pending
        };
        theta += applied.x;
        phi = (phi + applied.y).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let previous = camera.position;
        camera.position = self.target + new_offset;
        camera.look_at(self.target);

        if self.enable_damping {
            self.pending *= 1.0 - self.damping_factor;
        } else {
            self.pending = Vec2::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(camera.position) > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{ElementState, MouseButton, MouseScrollDelta};

    fn camera_at(position: Vec3) -> Camera {
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 100.0, position);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn undamped() -> OrbitControls {
        let config = ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        };
        OrbitControls::new(&config, Vec3::ZERO)
    }

    #[test]
    fn test_idle_update_keeps_camera() {
        let mut controls = OrbitControls::new(&ControlsConfig::default(), Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        let moved = controls.update(&mut camera);
        assert!(!moved);
        assert!((camera.position - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_drag_full_height_turns_once_around() {
        let mut controls = undamped();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        // A quarter of the height is a quarter turn.
        controls.drag(Vec2::new(250.0, 0.0), 1000.0);
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-4);
        assert!((camera.forward() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_damping_applies_fraction_and_decays() {
        let mut controls = OrbitControls::new(&ControlsConfig::default(), Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.rotate_left(-1.0);

        controls.update(&mut camera);
        let theta = camera.position.x.atan2(camera.position.z);
        assert!((theta - 0.05).abs() < 1e-4);
        assert!(controls.is_moving());

        controls.update(&mut camera);
        let theta = camera.position.x.atan2(camera.position.z);
        assert!((theta - (0.05 + 0.05 * 0.95)).abs() < 1e-4);
    }

    #[test]
    fn test_motion_settles_after_release() {
        let mut controls = OrbitControls::new(&ControlsConfig::default(), Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.drag(Vec2::new(40.0, 10.0), 720.0);
        for _ in 0..600 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
        assert!((camera.position.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_clamped() {
        let mut controls = undamped();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y > 1.99);
        assert!(camera.position.y <= 2.0);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn test_scroll_up_moves_closer() {
        let mut controls = undamped();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.scroll(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 1.9).abs() < 1e-4);

        controls.scroll(-1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_distance_clamped() {
        let config = ControlsConfig {
            enable_damping: false,
            min_distance: 1.5,
            max_distance: 3.0,
            ..ControlsConfig::default()
        };
        let mut controls = OrbitControls::new(&config, Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.scroll(50.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 1.5).abs() < 1e-4);
        controls.scroll(-50.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_handle_pointer_consumes_input() {
        let mut controls = undamped();
        let mut pointer = PointerState::new();
        pointer.on_cursor_moved(100.0, 100.0);
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        pointer.on_cursor_moved(150.0, 100.0);
        pointer.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));

        controls.handle_pointer(&mut pointer, 720.0);
        assert!(controls.is_moving());
        assert_eq!(pointer.drag_delta(), Vec2::ZERO);
        assert_eq!(pointer.scroll_lines(), 0.0);
    }
}
