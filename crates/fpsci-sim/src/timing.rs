//! Simulation clock and frame duration history.

use std::collections::VecDeque;

/// Time values captured once at the start of a tick and shared by everything
/// advanced during it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    /// Simulation time at the end of this tick (seconds)
    pub now: f64,
    /// Duration of this tick (seconds)
    pub dt: f32,
}

/// Accumulates simulation time from per-frame deltas.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
    frames: u64,
}

impl SimClock {
    /// Create a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `rdt` seconds. Negative deltas are treated as zero.
    pub fn tick(&mut self, rdt: f32) -> TickSnapshot {
        let dt = rdt.max(0.0);
        self.now += f64::from(dt);
        self.frames += 1;
        TickSnapshot { now: self.now, dt }
    }

    /// Current simulation time (seconds).
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.now
    }

    /// Ticks taken so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

/// Bounded history of recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameHistory {
    frame_times: VecDeque<f32>,
    max_samples: usize,
}

impl FrameHistory {
    /// Create a history holding at most `max_samples` durations.
    #[must_use]
    pub fn new(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a frame duration, dropping the oldest past capacity.
    pub fn push(&mut self, dt: f32) {
        if self.max_samples == 0 {
            return;
        }
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
    }

    /// Average frame duration in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.frame_times.iter().sum();
        sum / self.frame_times.len() as f32 * 1000.0
    }

    /// Frames per second derived from the average duration.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let avg_ms = self.average_frame_time_ms();
        if avg_ms > 0.0 {
            1000.0 / avg_ms
        } else {
            0.0
        }
    }

    /// Recorded durations, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.frame_times.iter().copied()
    }

    /// Number of recorded durations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame_times.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame_times.is_empty()
    }

    /// Capacity.
    #[must_use]
    pub const fn max_samples(&self) -> usize {
        self.max_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates() {
        let mut clock = SimClock::new();
        let first = clock.tick(0.5);
        let second = clock.tick(0.25);
        assert_eq!(first.now, 0.5);
        assert_eq!(second.now, 0.75);
        assert_eq!(second.dt, 0.25);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn test_clock_ignores_negative_delta() {
        let mut clock = SimClock::new();
        let snap = clock.tick(-1.0);
        assert_eq!(snap.dt, 0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = FrameHistory::new(3);
        for dt in [0.1, 0.2, 0.3, 0.4] {
            history.push(dt);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.samples().collect::<Vec<_>>(), vec![0.2, 0.3, 0.4]);
        assert!((history.average_frame_time_ms() - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_history_fps() {
        let mut history = FrameHistory::new(360);
        assert_eq!(history.fps(), 0.0);
        for _ in 0..10 {
            history.push(1.0 / 60.0);
        }
        assert!((history.fps() - 60.0).abs() < 0.1);
    }
}
