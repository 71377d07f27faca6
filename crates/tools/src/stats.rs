use cubefield_kernel::FrameInfo;
use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of frame durations for the diagnostics overlay.
pub struct FrameStats {
    window: VecDeque<Duration>,
    capacity: usize,
    total_frames: u64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameStats {
    /// A window of `capacity` frames; at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_frames: 0,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(dt);
        self.total_frames += 1;
    }

    /// Record a scheduler tick. The first tick has no predecessor and
    /// non-finite deltas carry no timing, so both are skipped.
    pub fn record_frame(&mut self, frame: &FrameInfo) {
        if frame.frame == 0 || !frame.delta.is_finite() || frame.delta < 0.0 {
            return;
        }
        self.record(Duration::from_secs_f32(frame.delta));
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    /// Frames recorded since creation, including those that left the window.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn average(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        self.window.iter().sum::<Duration>() / self.window.len() as u32
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or(Duration::ZERO)
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    /// Frames per second over the window; zero until a frame has a duration.
    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.0} fps ({:.2} ms avg, {:.2}-{:.2} ms)",
            self.fps(),
            self.average().as_secs_f64() * 1e3,
            self.min().as_secs_f64() * 1e3,
            self.max().as_secs_f64() * 1e3,
        )
    }
}
