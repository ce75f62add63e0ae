use std::fmt;

use et_core::Scene;
use log::{error, info};

use crate::config::{FaultPolicy, RuntimeConfig};
use crate::context::{FrameContext, LoopControl, StopHandle};
use crate::error::{Phase, RuntimeError, RuntimeResult};
use crate::registry::SystemRegistry;
use crate::system::System;
use crate::time::{FixedStep, FrameClock, Time, WallClock};

/// Lifecycle state of a [`Runtime`]. A runtime runs once; `Stopped` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Systems may be registered; `run` has not been called.
    Uninitialized,
    /// Inside the frame loop.
    Running,
    /// Calling `shutdown` on every system.
    ShuttingDown,
    /// Finished.
    Stopped,
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeState::Uninitialized => "uninitialized",
            RuntimeState::Running => "running",
            RuntimeState::ShuttingDown => "shutting down",
            RuntimeState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A system error recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFault {
    /// Name of the failing system.
    pub system: String,
    /// The phase that failed.
    pub phase: Phase,
    /// The error message.
    pub message: String,
    /// Frame number at the time of the fault (0 during init).
    pub frame: u64,
}

impl fmt::Display for SystemFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "system '{}' failed during {} (frame {}): {}",
            self.system, self.phase, self.frame, self.message
        )
    }
}

impl From<SystemFault> for RuntimeError {
    fn from(fault: SystemFault) -> Self {
        RuntimeError::System {
            system: fault.system,
            phase: fault.phase,
            message: fault.message,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Frames completed.
    pub frames: u64,
    /// Fixed updates dispatched.
    pub fixed_updates: u64,
    /// Simulated seconds (sum of clamped frame deltas).
    pub elapsed: f64,
    /// System faults recorded during the run. A faulting run under
    /// [`FaultPolicy::Halt`] returns an error instead of a report; its
    /// faults stay readable through [`Runtime::faults`].
    pub faults: Vec<SystemFault>,
}

/// The engine driver.
///
/// Owns the scene, the system registry and the frame loop. Each iteration
/// measures the frame delta, runs `update` on every system, drains the
/// fixed-step accumulator with `fixed_update`, then runs `render`. The loop
/// ends when a stop is requested or `max_frames` is reached, after which
/// every system is shut down.
pub struct Runtime {
    config: RuntimeConfig,
    scene: Scene,
    registry: SystemRegistry,
    state: RuntimeState,
    control: LoopControl,
    time: Time,
    faults: Vec<SystemFault>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("frame", &self.time.frame)
            .field("systems", &self.registry.names())
            .field("entities", &self.scene.len())
            .finish()
    }
}

impl Runtime {
    /// Create a runtime from a validated configuration.
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        config.validate()?;
        let time = Time::new(config.fixed_delta);
        Ok(Self {
            config,
            scene: Scene::new(),
            registry: SystemRegistry::new(),
            state: RuntimeState::Uninitialized,
            control: LoopControl::new(),
            time,
            faults: Vec::new(),
        })
    }

    /// Register a system. See [`SystemRegistry::register`].
    pub fn register<S: System + 'static>(&mut self, system: S) -> bool {
        self.registry.register(system)
    }

    /// The runtime's configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, mutably.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The registered systems.
    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    /// The registered systems, mutably.
    pub fn registry_mut(&mut self) -> &mut SystemRegistry {
        &mut self.registry
    }

    /// Frame timing of the current or last run.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Faults recorded so far.
    pub fn faults(&self) -> &[SystemFault] {
        &self.faults
    }

    /// Request that the loop end after the current iteration.
    pub fn stop(&self) {
        self.control.request_stop();
    }

    /// A handle for stopping the loop from outside.
    pub fn stop_handle(&self) -> StopHandle {
        self.control.handle()
    }

    /// Run on the wall clock, paced to `target_fps` if set.
    pub fn run(&mut self) -> RuntimeResult<RunReport> {
        let mut clock = WallClock::new();
        if let Some(fps) = self.config.target_fps {
            clock = clock.with_target_fps(fps);
        }
        self.run_with_clock(&mut clock)
    }

    /// Run the loop to completion with the given clock.
    ///
    /// Fails with [`RuntimeError::InvalidState`] unless the runtime is
    /// uninitialized. Under [`FaultPolicy::Halt`] the first system error
    /// ends the loop; shutdown still runs and the error is returned.
    pub fn run_with_clock(&mut self, clock: &mut dyn FrameClock) -> RuntimeResult<RunReport> {
        if self.state != RuntimeState::Uninitialized {
            return Err(RuntimeError::InvalidState {
                operation: "run",
                state: self.state,
            });
        }

        info!("Initializing Runtime...");
        info!("Operating system: {}", std::env::consts::OS);
        self.state = RuntimeState::Running;

        let mut outcome = self.dispatch(Phase::Init);
        if outcome.is_ok() {
            outcome = self.frame_loop(clock);
        }

        info!("Shutting down...");
        self.state = RuntimeState::ShuttingDown;
        let shutdown = self.dispatch(Phase::Shutdown);
        self.state = RuntimeState::Stopped;

        outcome?;
        shutdown?;
        Ok(RunReport {
            frames: self.time.frame,
            fixed_updates: self.time.fixed_updates,
            elapsed: self.time.elapsed,
            faults: self.faults.clone(),
        })
    }

    fn frame_loop(&mut self, clock: &mut dyn FrameClock) -> RuntimeResult<()> {
        let mut fixed = FixedStep::new(self.config.fixed_delta, self.config.max_fixed_steps);
        loop {
            if self.control.is_stop_requested() {
                break;
            }
            if self
                .config
                .max_frames
                .is_some_and(|max| self.time.frame >= max)
            {
                break;
            }

            let raw = clock.tick();
            let delta = if raw.is_finite() {
                raw.clamp(0.0, self.config.max_frame_delta)
            } else {
                0.0
            };
            self.time.begin_frame(delta);
            fixed.accumulate(delta);

            self.dispatch(Phase::Update)?;
            for _ in 0..fixed.drain() {
                self.dispatch(Phase::FixedUpdate)?;
                self.time.fixed_updates += 1;
            }
            self.time.alpha = fixed.alpha();
            self.dispatch(Phase::Render)?;
        }
        Ok(())
    }

    /// Run `phase` on every system in registration order.
    ///
    /// Each system is swapped out of the registry while it runs so it can
    /// reach the others through the context.
    fn dispatch(&mut self, phase: Phase) -> RuntimeResult<()> {
        let halt = self.config.fault_policy == FaultPolicy::Halt;
        let mut first_fault: Option<SystemFault> = None;

        for index in 0..self.registry.len() {
            let mut system = self.registry.take(index);
            let result = {
                let mut ctx = FrameContext {
                    scene: &mut self.scene,
                    systems: self.registry.view(),
                    time: &self.time,
                    control: &self.control,
                };
                match phase {
                    Phase::Init => system.init(&mut ctx),
                    Phase::Update => system.update(&mut ctx, self.time.delta),
                    Phase::FixedUpdate => system.fixed_update(&mut ctx),
                    Phase::Render => system.render(&mut ctx),
                    Phase::Shutdown => system.shutdown(&mut ctx),
                }
            };
            self.registry.restore(index, system);

            if let Err(err) = result {
                let fault = SystemFault {
                    system: self.registry.systems()[index].name().to_string(),
                    phase,
                    message: err.to_string(),
                    frame: self.time.frame,
                };
                error!("{fault}");
                self.faults.push(fault.clone());
                if halt {
                    // shutdown still reaches every system
                    if phase != Phase::Shutdown {
                        return Err(fault.into());
                    }
                    if first_fault.is_none() {
                        first_fault = Some(fault);
                    }
                }
            }
        }

        match first_fault {
            Some(fault) => Err(fault.into()),
            None => Ok(()),
        }
    }
}
