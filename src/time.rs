//! Frame timing
//!
//! [`FrameClock`] is owned by the app and ticked once per frame. The
//! accumulated time wraps so wave phases stay precise in `f32`.

use std::time::{Duration, Instant};

/// Accumulated time wraps back to zero at this many seconds
pub const TIME_WRAP: f32 = 1000.0;

/// Snapshot of the clock for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since start, modulo [`TIME_WRAP`]
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
    pub frame: u64,
}

pub struct FrameClock {
    last: Instant,
    current: FrameTime,
    fps_window: Duration,
    fps_frames: u32,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            current: FrameTime::default(),
            fps_window: Duration::ZERO,
            fps_frames: 0,
            fps: 0.0,
        }
    }

    /// Measures the elapsed wall time and advances the clock
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        self.advance(elapsed)
    }

    /// Advances the clock by an explicit duration
    pub fn advance(&mut self, elapsed: Duration) -> FrameTime {
        let delta = elapsed.as_secs_f32();
        self.current = FrameTime {
            time: (self.current.time + delta) % TIME_WRAP,
            delta,
            frame: self.current.frame + 1,
        };

        self.fps_window += elapsed;
        self.fps_frames += 1;
        if self.fps_window >= Duration::from_millis(500) {
            self.fps = self.fps_frames as f32 / self.fps_window.as_secs_f32();
            self.fps_window = Duration::ZERO;
            self.fps_frames = 0;
        }

        self.current
    }

    pub fn current(&self) -> FrameTime {
        self.current
    }

    /// Frames per second averaged over roughly half a second
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(250));
        let t = clock.advance(Duration::from_millis(500));
        assert!((t.time - 0.75).abs() < 1e-6);
        assert!((t.delta - 0.5).abs() < 1e-6);
        assert_eq!(t.frame, 2);
        assert_eq!(clock.current(), t);
    }

    #[test]
    fn test_time_wraps() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_secs(999));
        let t = clock.advance(Duration::from_secs(2));
        assert!((t.time - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::new();
        for _ in 0..30 {
            clock.advance(Duration::from_millis(20));
        }
        assert!((clock.fps() - 50.0).abs() < 1.0);
    }
}
