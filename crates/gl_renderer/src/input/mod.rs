//! Input state helpers
//!
//! Small pieces of per-frame input state that sit between raw window events
//! and the camera: cursor delta tracking, edge-triggered key toggles and the
//! set of held movement keys.

use bitflags::bitflags;

use crate::render::camera::CameraMovement;

/// Turns absolute cursor positions into per-event deltas
///
/// The first position after creation (or [`MouseTracker::reset`]) only
/// records the cursor and yields a zero delta, so the camera does not jump
/// when the cursor enters the window.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    /// Create a tracker that has not seen the cursor yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed an absolute cursor position, get `(dx, dy)` in pixels
    ///
    /// `dy` is inverted: screen Y grows downwards while pitch grows upwards.
    pub fn delta(&mut self, x: f64, y: f64) -> (f32, f32) {
        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));
        ((x - last_x) as f32, (last_y - y) as f32)
    }

    /// Forget the last position
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Edge-triggered toggle for a held key
///
/// The value flips once per press; holding the key across frames does not
/// flip it again until the key has been released.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLatch {
    value: bool,
    held: bool,
}

impl KeyLatch {
    /// Latch with an initial value
    pub fn new(value: bool) -> Self {
        Self { value, held: false }
    }

    /// Feed the key's current state; returns `true` when the value flipped
    pub fn update(&mut self, pressed: bool) -> bool {
        let flipped = pressed && !self.held;
        if flipped {
            self.value = !self.value;
        }
        self.held = pressed;
        flipped
    }

    /// Current value
    pub fn value(&self) -> bool {
        self.value
    }
}

bitflags! {
    /// Movement keys held during a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovementKeys: u8 {
        /// W
        const FORWARD = 1 << 0;
        /// S
        const BACKWARD = 1 << 1;
        /// A
        const LEFT = 1 << 2;
        /// D
        const RIGHT = 1 << 3;
    }
}

impl MovementKeys {
    /// Camera movements for the held keys, in a fixed order
    pub fn movements(self) -> impl Iterator<Item = CameraMovement> {
        [
            (Self::FORWARD, CameraMovement::Forward),
            (Self::BACKWARD, CameraMovement::Backward),
            (Self::LEFT, CameraMovement::Left),
            (Self::RIGHT, CameraMovement::Right),
        ]
        .into_iter()
        .filter(move |(key, _)| self.contains(*key))
        .map(|(_, movement)| movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cursor_event_is_zero() {
        let mut tracker = MouseTracker::new();
        assert_eq!(tracker.delta(512.0, 288.0), (0.0, 0.0));
        assert_eq!(tracker.delta(515.0, 280.0), (3.0, 8.0));

        tracker.reset();
        assert_eq!(tracker.delta(10.0, 10.0), (0.0, 0.0));
    }

    #[test]
    fn test_latch_flips_once_per_press() {
        let mut latch = KeyLatch::new(false);

        assert!(latch.update(true));
        assert!(latch.value());
        assert!(!latch.update(true));
        assert!(latch.value());

        assert!(!latch.update(false));
        assert!(latch.update(true));
        assert!(!latch.value());
    }

    #[test]
    fn test_movement_keys_map_to_directions() {
        let keys = MovementKeys::FORWARD | MovementKeys::RIGHT;
        let movements: Vec<_> = keys.movements().collect();
        assert_eq!(movements, vec![CameraMovement::Forward, CameraMovement::Right]);

        assert_eq!(MovementKeys::empty().movements().count(), 0);
    }
}
