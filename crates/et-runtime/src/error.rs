use std::fmt;

use et_core::CoreError;

use crate::runtime::RuntimeState;

/// Alias for `Result<T, RuntimeError>`.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A lifecycle phase a system takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// One-time setup before the first frame.
    Init,
    /// Variable-rate update, once per frame.
    Update,
    /// Fixed-rate update, zero or more times per frame.
    FixedUpdate,
    /// Presentation, once per frame.
    Render,
    /// One-time teardown after the last frame.
    Shutdown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::Update => "update",
            Phase::FixedUpdate => "fixed_update",
            Phase::Render => "render",
            Phase::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Errors raised by the runtime and by systems.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// An operation was attempted in the wrong lifecycle state.
    #[error("cannot {operation} while the runtime is {state}")]
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// The state the runtime was in.
        state: RuntimeState,
    },

    /// A system reported a failure from inside a phase.
    #[error("{0}")]
    Failed(String),

    /// A system failed and the fault policy halted the loop.
    #[error("system '{system}' failed during {phase}: {message}")]
    System {
        /// Name of the failing system.
        system: String,
        /// The phase that failed.
        phase: Phase,
        /// The failure message.
        message: String,
    },

    /// An ECS operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl RuntimeError {
    /// Shorthand for [`RuntimeError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        RuntimeError::Failed(message.into())
    }
}
