//! Monotonic game clock

use std::time::{Duration, Instant};

/// Milliseconds since start plus per-frame delta
#[derive(Debug, Clone)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
    frame: u64,
}

impl Time {
    /// Start the clock now
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame: 0,
        }
    }

    /// Advance to the next frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame += 1;
    }

    /// Monotonic clock reading in milliseconds since the clock started
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Time between the last two frames
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Frame delta in seconds
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Frames counted so far
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let mut time = Time::new();
        let before = time.now_ms();

        std::thread::sleep(Duration::from_millis(5));
        time.update();

        assert!(time.now_ms() >= before + 5);
        assert!(time.delta() >= Duration::from_millis(5));
        assert!(time.delta_seconds() >= 0.005);
        assert_eq!(time.frame(), 1);
    }
}
