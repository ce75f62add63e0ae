use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use et_core::Scene;

use crate::registry::Systems;
use crate::time::Time;

/// Mutable context passed to each system during a phase.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// The entities of the running world.
    pub scene: &'a mut Scene,
    /// Every other registered system.
    pub systems: Systems<'a>,
    /// Frame timing.
    pub time: &'a Time,
    /// Loop control for this run.
    pub control: &'a LoopControl,
}

impl FrameContext<'_> {
    /// Ask the runtime to stop after the current iteration.
    pub fn stop(&self) {
        self.control.request_stop();
    }

    /// Clamped seconds since the previous frame.
    pub fn delta(&self) -> f64 {
        self.time.delta
    }
}

/// Stop flag checked at the top of every loop iteration.
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    stop: Arc<AtomicBool>,
}

impl LoopControl {
    /// A control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the loop end after the current iteration.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// A handle that can request a stop from outside the loop.
    pub fn handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
        }
    }
}

/// Cloneable handle for stopping a runtime from outside its systems.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request that the loop end after the current iteration.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}
