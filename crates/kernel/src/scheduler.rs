use crate::animation::{AnimateReport, AnimationRegistry};
use std::cell::Cell;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Source of elapsed time since the scheduler started.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Clock advanced by hand, for tests and reproducible replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }
}

/// Cloneable cancellation flag checked at the start of every tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

/// What one tick saw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Zero-based frame counter.
    pub frame: u64,
    /// Seconds since the scheduler started.
    pub elapsed: f64,
    /// Seconds since the previous tick (0 on the first).
    pub delta: f32,
    pub animation: AnimateReport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The frame ran; the host should arm the next tick.
    Continue(FrameInfo),
    Stopped,
}

/// Per-frame work the host plugs into the scheduler, run after animation.
pub trait FrameHooks {
    type Error: Display;

    fn update_controls(&mut self, delta: f32);

    fn update_overlay(&mut self, frame: &FrameInfo);

    fn render(&mut self, frame: &FrameInfo) -> Result<(), Self::Error>;
}

/// Drives animate → controls → overlay → render once per host frame.
pub struct FrameScheduler<C: Clock = SystemClock> {
    clock: C,
    state: SchedulerState,
    stop: StopHandle,
    frame: u64,
    last_elapsed: f64,
}

impl FrameScheduler<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for FrameScheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FrameScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: SchedulerState::Running,
            stop: StopHandle::default(),
            frame: 0,
            last_elapsed: 0.0,
        }
    }

    /// Share an existing stop flag instead of a fresh one.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&mut self) {
        self.stop.stop();
    }

    /// Run one frame unless a stop was requested.
    ///
    /// Render errors are logged and do not stop the loop.
    pub fn tick<H: FrameHooks>(
        &mut self,
        registry: &mut AnimationRegistry,
        hooks: &mut H,
    ) -> TickOutcome {
        if self.state == SchedulerState::Stopped {
            return TickOutcome::Stopped;
        }
        if self.stop.is_stopped() {
            self.state = SchedulerState::Stopped;
            tracing::info!(frames = self.frame, "frame scheduler stopped");
            return TickOutcome::Stopped;
        }

        let _span = tracing::info_span!("frame", frame = self.frame).entered();
        let elapsed = self.clock.elapsed().as_secs_f64();
        let delta = if self.frame == 0 {
            0.0
        } else {
            (elapsed - self.last_elapsed).max(0.0) as f32
        };

        let animation = registry.animate(elapsed);
        let info = FrameInfo {
            frame: self.frame,
            elapsed,
            delta,
            animation,
        };

        hooks.update_controls(delta);
        hooks.update_overlay(&info);
        if let Err(e) = hooks.render(&info) {
            tracing::error!(frame = info.frame, "render failed: {e}");
        }

        self.frame += 1;
        self.last_elapsed = elapsed;
        TickOutcome::Continue(info)
    }

    /// Tick in a loop until stopped or `max_frames` frames have run.
    pub fn run<H: FrameHooks>(
        &mut self,
        registry: &mut AnimationRegistry,
        hooks: &mut H,
        max_frames: Option<u64>,
    ) -> u64 {
        let start = self.frame;
        while max_frames.is_none_or(|max| self.frame - start < max) {
            if self.tick(registry, hooks) == TickOutcome::Stopped {
                break;
            }
        }
        self.frame - start
    }
}
