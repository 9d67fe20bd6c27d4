//! Time management utilities
//!
//! All engine-facing durations are expressed in milliseconds.

use std::time::{Duration, Instant};

/// Reference frame length the smoothing and particle steps are normalised to
pub const FRAME_MS: f32 = 16.67;

/// Frame clock measuring wall-clock time between consecutive ticks
#[derive(Debug, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    last_delta_ms: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock that has not ticked yet
    pub const fn new() -> Self {
        Self {
            last_tick: None,
            last_delta_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Record a tick and return milliseconds since the previous one
    ///
    /// The first tick has no predecessor and reports zero.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.last_delta_ms = self
            .last_tick
            .map_or(0.0, |last| duration_ms(now.duration_since(last)));
        self.last_tick = Some(now);
        self.frame_count += 1;
        self.last_delta_ms
    }

    /// Milliseconds between the last two ticks
    pub const fn last_delta_ms(&self) -> f32 {
        self.last_delta_ms
    }

    /// Number of ticks recorded
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous frames per second derived from the last delta
    pub fn fps(&self) -> f32 {
        if self.last_delta_ms > 0.0 {
            1000.0 / self.last_delta_ms
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring a single span
#[derive(Debug)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Elapsed milliseconds since start
    pub fn elapsed_ms(&self) -> f32 {
        duration_ms(self.start_time.elapsed())
    }
}

/// Convert a duration to fractional milliseconds
pub fn duration_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
