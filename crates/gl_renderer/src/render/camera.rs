//! # Fly Camera
//!
//! Euler-angle camera driven by keyboard, mouse and scroll input.
//!
//! ## Design Principles
//! - **API-free**: only math, no GL or window types
//! - **Derived basis**: `front`, `right` and `up` are recomputed from yaw,
//!   pitch and the world up vector after every orientation change and are
//!   never written directly, so they cannot drift from orthonormality
//! - **Zoom is field of view**: scrolling narrows the projection, it does
//!   not move the camera

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Pitch limit in degrees when pitch constraining is requested
pub const PITCH_LIMIT: f32 = 89.0;

/// Narrowest field of view in degrees
pub const MIN_ZOOM: f32 = 1.0;

/// Widest field of view in degrees
pub const MAX_ZOOM: f32 = 45.0;

/// Movement directions relative to the camera basis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along `front`
    Forward,
    /// Against `front`
    Backward,
    /// Against `right`
    Left,
    /// Along `right`
    Right,
}

/// First-person camera
///
/// # Coordinate System
/// Right-handed, Y-up. With yaw -90° and pitch 0° the camera looks down -Z,
/// which is the OpenGL default view direction.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    /// Degrees; -90 looks down -Z
    yaw: f32,
    /// Degrees
    pitch: f32,

    movement_speed: f32,
    mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    zoom: f32,
}

impl Camera {
    /// Camera at `position` with the default orientation and tuning
    pub fn new(position: Vec3) -> Self {
        Self::from_config(&CameraConfig::at(position))
    }

    /// Camera from a configured start pose
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: config.world_up,
            right: Vec3::new(1.0, 0.0, 0.0),
            world_up: config.world_up,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom: config.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        camera.update_vectors();
        log::debug!(
            "Camera at {:?}, yaw {:.1}°, pitch {:.1}°, zoom {:.1}°",
            camera.position,
            camera.yaw,
            camera.pitch,
            camera.zoom
        );
        camera
    }

    /// Move along the camera basis by `movement_speed * dt`
    ///
    /// `dt` must be finite; the caller owns the clock.
    pub fn advance(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn the camera by a cursor delta in pixels
    ///
    /// `dy` is expected already inverted (positive looks up), which is what
    /// [`crate::input::MouseTracker`] produces from raw screen coordinates.
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch += dy * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Narrow or widen the field of view by a scroll delta
    pub fn apply_zoom_delta(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Right-handed look-at matrix for the current pose
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit camera up
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit camera right
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn update_vectors(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);

        let front = Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin());
        self.front = front.normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::zeros());
        assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(camera.right(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn test_view_matrix_matches_reference_look_at() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));

        #[rustfmt::skip]
        let expected = Mat4::new(
            1.0, 0.0, 0.0,  0.0,
            0.0, 1.0, 0.0,  0.0,
            0.0, 0.0, 1.0, -5.0,
            0.0, 0.0, 0.0,  1.0,
        );
        assert_relative_eq!(camera.view_matrix(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_stays_within_limit() {
        let mut camera = Camera::default();
        for _ in 0..50 {
            camera.apply_look_delta(3.0, 400.0, true);
            assert!(camera.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        for _ in 0..50 {
            camera.apply_look_delta(-7.0, -333.0, true);
            assert!(camera.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_unconstrained_pitch_passes_limit() {
        let mut camera = Camera::default();
        camera.apply_look_delta(0.0, 1000.0, false);
        assert_relative_eq!(camera.pitch(), 100.0, epsilon = 1e-4);
    }

    #[test]
    fn test_configured_pitch_is_clamped() {
        let config = CameraConfig { pitch: 120.0, ..CameraConfig::default() };
        let camera = Camera::from_config(&config);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        // Still facing down -Z, tilted up rather than flipped over
        assert!(camera.front().z < 0.0);
        assert!(camera.front().y > 0.0);

        let config = CameraConfig { pitch: -400.0, ..CameraConfig::default() };
        assert_eq!(Camera::from_config(&config).pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn test_zoom_stays_within_bounds() {
        let mut camera = Camera::default();
        for delta in [3.0, 10.0, 40.0, 0.5, -2.0, -100.0, 7.0] {
            camera.apply_zoom_delta(delta);
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&camera.zoom()));
        }

        camera.apply_zoom_delta(100.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);
        camera.apply_zoom_delta(-100.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut camera = Camera::default();
        for (dx, dy) in [(12.0, 5.0), (-40.0, 30.0), (250.0, -80.0), (1.0, 900.0)] {
            camera.apply_look_delta(dx, dy, true);

            assert_relative_eq!(camera.front().norm(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(camera.right().norm(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(camera.up().norm(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(camera.front().dot(&camera.right()), 0.0, epsilon = 1e-5);
            assert_relative_eq!(camera.front().dot(&camera.up()), 0.0, epsilon = 1e-5);
            assert_relative_eq!(camera.right().dot(&camera.up()), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_advance_moves_along_basis() {
        let mut camera = Camera::new(Vec3::zeros());

        camera.advance(CameraMovement::Forward, 2.0);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);

        camera.advance(CameraMovement::Right, 1.0);
        assert_relative_eq!(camera.position(), Vec3::new(2.5, 0.0, -5.0), epsilon = 1e-5);

        camera.advance(CameraMovement::Backward, 2.0);
        camera.advance(CameraMovement::Left, 1.0);
        assert_relative_eq!(camera.position(), Vec3::zeros(), epsilon = 1e-5);
    }
}
