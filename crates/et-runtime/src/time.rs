use std::time::{Duration, Instant};

use log::debug;

/// Source of per-frame elapsed time.
pub trait FrameClock {
    /// Seconds since the previous call. The first call returns 0.
    fn tick(&mut self) -> f64;
}

/// Monotonic wall clock, optionally paced to a target frame rate.
#[derive(Debug, Clone, Default)]
pub struct WallClock {
    last: Option<Instant>,
    frame_budget: Option<Duration>,
}

impl WallClock {
    /// An unthrottled clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep as needed so frames are at least `1 / fps` seconds apart.
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        if fps > 0 {
            self.frame_budget = Some(Duration::from_secs_f64(1.0 / f64::from(fps)));
        }
        self
    }
}

impl FrameClock for WallClock {
    fn tick(&mut self) -> f64 {
        if let (Some(last), Some(budget)) = (self.last, self.frame_budget) {
            let spent = last.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last = Some(now);
        delta
    }
}

/// Clock that advances by a constant delta every frame. Used for headless
/// runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct SteppedClock {
    delta: f64,
}

impl SteppedClock {
    /// A clock reporting `delta` seconds per frame.
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }
}

impl FrameClock for SteppedClock {
    fn tick(&mut self) -> f64 {
        self.delta
    }
}

/// Frame timing visible to systems.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Clamped seconds since the previous frame.
    pub delta: f64,
    /// Sum of all frame deltas.
    pub elapsed: f64,
    /// Seconds per fixed update.
    pub fixed_delta: f64,
    /// Frames started so far.
    pub frame: u64,
    /// Fixed updates run so far.
    pub fixed_updates: u64,
    /// Unconsumed fraction of a fixed step, in `[0, 1)`.
    pub alpha: f64,
}

impl Time {
    /// Timing for a loop with the given fixed interval.
    pub fn new(fixed_delta: f64) -> Self {
        Self {
            fixed_delta,
            ..Self::default()
        }
    }

    pub(crate) fn begin_frame(&mut self, delta: f64) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame += 1;
    }
}

/// Tolerance when comparing the accumulator against one step, so that
/// summing exact multiples of the step in floating point does not lose a
/// step to rounding.
const STEP_EPSILON: f64 = 1e-9;

/// Fixed-timestep accumulator.
///
/// Frame deltas are added with [`accumulate`](Self::accumulate);
/// [`drain`](Self::drain) reports how many whole steps to run and keeps the
/// remainder. At most `max_steps` are released per frame; anything beyond
/// that is dropped so a long stall cannot trigger an unbounded catch-up.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f64,
    max_steps: u32,
    accumulator: f64,
}

impl FixedStep {
    /// An empty accumulator releasing steps of `step` seconds.
    pub fn new(step: f64, max_steps: u32) -> Self {
        Self {
            step,
            max_steps,
            accumulator: 0.0,
        }
    }

    /// Add a frame's delta. Negative and non-finite deltas count as zero.
    pub fn accumulate(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }
    }

    /// Number of whole steps available this frame, removed from the
    /// accumulator.
    pub fn drain(&mut self) -> u32 {
        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= self.step {
            if steps == self.max_steps {
                debug!(
                    "dropping {:.4}s of fixed-step backlog after {steps} steps",
                    self.accumulator
                );
                self.accumulator = 0.0;
                break;
            }
            self.accumulator = (self.accumulator - self.step).max(0.0);
            steps += 1;
        }
        steps
    }

    /// Seconds waiting in the accumulator.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Unconsumed fraction of a step.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }
}
