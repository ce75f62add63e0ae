use et_runtime::RuntimeError;

/// Alias for `Result<T, ConsoleError>`.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Errors raised by the console systems.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// A generator was asked for a map smaller than it can lay out.
    #[error("map of {width}x{height} is too small; need at least {min_width}x{min_height}")]
    TooSmall {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Smallest usable width.
        min_width: i32,
        /// Smallest usable height.
        min_height: i32,
    },

    /// Generation parameters cannot produce a map.
    #[error("invalid dungeon config: {0}")]
    InvalidConfig(String),

    /// A key name could not be parsed.
    #[error("unknown key: '{0}'")]
    UnknownKey(String),

    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConsoleError> for RuntimeError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Io(io) => RuntimeError::Io(io),
            other => RuntimeError::Failed(other.to_string()),
        }
    }
}
