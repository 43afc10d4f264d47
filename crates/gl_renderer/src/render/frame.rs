//! Per-frame render loop state
//!
//! Everything the loop mutates between frames lives in one [`FrameContext`]
//! that the binaries thread through event handling, update and draw. There is
//! no process-wide state.

use crate::foundation::math::{utils, Mat4, Mat4Ext};
use crate::foundation::time::Timer;
use crate::input::{KeyLatch, MouseTracker, MovementKeys};
use crate::render::camera::{Camera, MAX_ZOOM};

/// Near clip plane distance
pub const NEAR_PLANE: f32 = 0.1;

/// Far clip plane distance
pub const FAR_PLANE: f32 = 1000.0;

/// Camera, input tracking, timing and toggles for the running loop
#[derive(Debug)]
pub struct FrameContext {
    /// The fly camera
    pub camera: Camera,
    mouse: MouseTracker,
    timer: Timer,
    blinn: KeyLatch,
    viewport: (u32, u32),
    shutdown: bool,
}

impl FrameContext {
    /// Context for a framebuffer of `width` x `height` pixels
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        Self {
            camera,
            mouse: MouseTracker::new(),
            timer: Timer::new(),
            blinn: KeyLatch::new(false),
            viewport: (width, height),
            shutdown: false,
        }
    }

    /// Start a frame; returns the seconds since the previous one
    pub fn begin_frame(&mut self) -> f32 {
        let dt = self.timer.tick();
        log::trace!("Frame {} dt {:.4}s", self.timer.frame_count(), dt);
        dt
    }

    /// Move the camera for every held movement key
    pub fn apply_movement(&mut self, keys: MovementKeys, dt: f32) {
        for movement in keys.movements() {
            self.camera.advance(movement, dt);
        }
    }

    /// Cursor moved to an absolute position
    pub fn on_cursor(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.mouse.delta(x, y);
        self.camera.apply_look_delta(dx, dy, true);
    }

    /// Scroll wheel moved
    pub fn on_scroll(&mut self, dy: f64) {
        self.camera.apply_zoom_delta(dy as f32);
    }

    /// Framebuffer resized; a zero-sized (minimized) framebuffer is ignored
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        log::debug!("Viewport resized to {}x{}", width, height);
    }

    /// Feed the Blinn toggle key state
    pub fn update_blinn(&mut self, pressed: bool) {
        if self.blinn.update(pressed) {
            log::info!("Specular model: {}", if self.blinn.value() { "Blinn-Phong" } else { "Phong" });
        }
    }

    /// Whether Blinn-Phong specular is selected
    pub fn blinn(&self) -> bool {
        self.blinn.value()
    }

    /// Ask the loop to stop after this iteration
    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Whether shutdown was requested
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    /// Framebuffer size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Perspective projection from the camera zoom
    pub fn projection(&self) -> Mat4 {
        let fov = utils::deg_to_rad(self.camera.zoom().min(MAX_ZOOM));
        Mat4::perspective(fov, self.aspect_ratio(), NEAR_PLANE, FAR_PLANE)
    }

    /// Camera view matrix
    pub fn view(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Average frame rate so far
    pub fn average_fps(&self) -> f32 {
        self.timer.average_fps()
    }

    /// Frames started so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec3, Vec4};
    use approx::assert_relative_eq;

    fn context() -> FrameContext {
        FrameContext::new(Camera::new(Vec3::new(0.0, 0.0, 5.0)), 1024, 576)
    }

    #[test]
    fn test_projection_uses_zoom_as_fov() {
        let mut frame = context();
        let wide = frame.projection();
        assert_relative_eq!(
            wide,
            Mat4::perspective(utils::deg_to_rad(45.0), 1024.0 / 576.0, NEAR_PLANE, FAR_PLANE)
        );

        frame.on_scroll(30.0);
        let narrow = frame.projection();
        assert!(narrow[(1, 1)] > wide[(1, 1)]);
    }

    #[test]
    fn test_resize_updates_aspect_and_ignores_zero() {
        let mut frame = context();
        frame.on_resize(800, 800);
        assert_relative_eq!(frame.aspect_ratio(), 1.0);

        frame.on_resize(0, 0);
        assert_eq!(frame.viewport(), (800, 800));
    }

    #[test]
    fn test_first_cursor_event_does_not_turn_camera() {
        let mut frame = context();
        frame.on_cursor(300.0, 200.0);
        assert_eq!(frame.camera.yaw(), -90.0);
        assert_eq!(frame.camera.pitch(), 0.0);

        // Cursor moved up the screen: pitch increases
        frame.on_cursor(310.0, 190.0);
        assert_relative_eq!(frame.camera.yaw(), -89.0, epsilon = 1e-5);
        assert_relative_eq!(frame.camera.pitch(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_movement_and_view() {
        let mut frame = context();
        frame.apply_movement(MovementKeys::FORWARD, 2.0);
        assert_relative_eq!(frame.camera.position(), Vec3::zeros(), epsilon = 1e-5);

        // The origin is now at the eye
        let eye = frame.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(eye, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_blinn_toggle_and_shutdown() {
        let mut frame = context();
        assert!(!frame.blinn());
        frame.update_blinn(true);
        frame.update_blinn(true);
        assert!(frame.blinn());
        frame.update_blinn(false);
        frame.update_blinn(true);
        assert!(!frame.blinn());

        assert!(!frame.shutdown_requested());
        frame.request_shutdown();
        assert!(frame.shutdown_requested());
    }
}
