use crate::id::EntityId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the ECS core and the numeric vector utility.
///
/// Logical conflicts (duplicate component kinds, removing a child that is
/// not attached) are not errors; they are logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The requested entity ID does not exist in the scene.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Attaching `child` under `parent` would make an entity its own ancestor.
    #[error("cannot parent {child} under {parent}: the hierarchy would contain a cycle")]
    HierarchyCycle {
        /// The entity being reparented.
        child: EntityId,
        /// The requested new parent.
        parent: EntityId,
    },

    /// A vector was built from a slice of the wrong length.
    #[error("vector expects {expected} elements, got {actual}")]
    VectorLength {
        /// The vector's fixed dimension.
        expected: usize,
        /// The number of elements supplied.
        actual: usize,
    },

    /// A checked element access was out of range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of elements available.
        len: usize,
    },
}
