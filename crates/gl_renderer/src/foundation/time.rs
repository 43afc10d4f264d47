//! Time management utilities

use std::time::Instant;

/// Monotonic frame timer
///
/// Measures the wall time between consecutive [`Timer::tick`] calls. The
/// first tick measures from timer creation.
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to the next frame and return its delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.record(elapsed.as_secs_f32())
    }

    fn record(&mut self, delta_time: f32) -> f32 {
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
        delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time across all ticks
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_monotonic() {
        let mut timer = Timer::new();
        let first = timer.tick();
        let second = timer.tick();
        assert!(first >= 0.0);
        assert!(second >= 0.0);
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= first);
    }

    #[test]
    fn test_average_fps() {
        let mut timer = Timer::new();
        assert_eq!(timer.average_fps(), 0.0);

        for _ in 0..4 {
            timer.record(0.25);
        }
        assert_eq!(timer.delta_time(), 0.25);
        assert!((timer.average_fps() - 4.0).abs() < 1e-5);
    }
}
