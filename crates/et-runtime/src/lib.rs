//! System lifecycle and the fixed-timestep run loop for the Eternum engine.
//!
//! Systems implement [`System`] and are registered into a [`Runtime`],
//! which owns the [`Scene`](et_core::Scene) and drives every system through
//! `init`, then per frame `update`, `fixed_update` and `render`, and finally
//! `shutdown`.
//!
//! ```
//! use et_runtime::{Runtime, RuntimeConfig, SteppedClock};
//!
//! let mut runtime = Runtime::new(RuntimeConfig::default().with_max_frames(10)).unwrap();
//! let report = runtime.run_with_clock(&mut SteppedClock::new(0.016)).unwrap();
//! assert_eq!(report.frames, 10);
//! ```

/// Tracking every live component of one kind.
pub mod component_system;
/// Runtime configuration and fault policy.
pub mod config;
/// The context handed to systems during a phase.
pub mod context;
/// Error types and lifecycle phases.
pub mod error;
/// Ordered, deduplicated system collection.
pub mod registry;
/// The engine driver and its state machine.
pub mod runtime;
/// The system trait.
pub mod system;
/// Frame clocks and the fixed-step accumulator.
pub mod time;

/// Re-export the component system.
pub use component_system::ComponentSystem;
/// Re-export configuration types.
pub use config::{FaultPolicy, RuntimeConfig};
/// Re-export context types.
pub use context::{FrameContext, LoopControl, StopHandle};
/// Re-export error types.
pub use error::{Phase, RuntimeError, RuntimeResult};
/// Re-export registry types.
pub use registry::{SystemRegistry, Systems};
/// Re-export runtime types.
pub use runtime::{RunReport, Runtime, RuntimeState, SystemFault};
/// Re-export the system trait.
pub use system::System;
/// Re-export timing types.
pub use time::{FixedStep, FrameClock, SteppedClock, Time, WallClock};
