//! Frame timing for the render loop.

use std::time::{Duration, Instant};

/// Tracks per-frame delta time and total elapsed time.
///
/// The delta is handed to the scene untouched: a stall produces a large
/// step and a visible orbit jump, which is the accepted behavior here.
#[derive(Debug)]
pub struct Time {
    start_time: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to a new frame. Call once at the top of the loop.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Delta time of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total time since startup in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        (self.last_frame - self.start_time).as_secs_f32()
    }

    /// Frames seen since startup.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous FPS from the last frame's delta.
    pub fn fps(&self) -> f32 {
        let dt = self.delta.as_secs_f32();
        if dt > 0.0 {
            1.0 / dt
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_advances_frame_count_and_delta() {
        let mut time = Time::new();
        assert_eq!(time.frame_count(), 0);
        std::thread::sleep(Duration::from_millis(2));
        time.update();
        assert_eq!(time.frame_count(), 1);
        assert!(time.delta_seconds() > 0.0);
        assert!(time.elapsed_seconds() >= time.delta_seconds());
    }

    #[test]
    fn fps_is_zero_before_first_update() {
        let time = Time::new();
        assert_eq!(time.fps(), 0.0);
    }
}
