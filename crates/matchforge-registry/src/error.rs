//! Error types for the registry layer.

use crate::SessionName;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The session name is already taken, or the host already has a
    /// live session. A player hosts at most one session at a time.
    #[error("session {0} already exists")]
    AlreadyExists(SessionName),

    /// No session with this name exists.
    #[error("session {0} not found")]
    NotFound(SessionName),

    /// The occupancy change would exceed the session's capacity.
    #[error("session {0} is at capacity")]
    CapacityExceeded(SessionName),

    /// The occupancy change would drop occupancy below zero.
    #[error("session {0} occupancy would underflow")]
    OccupancyUnderflow(SessionName),

    /// A session cannot be created with zero capacity.
    #[error("invalid capacity for session {0}: capacity must be > 0")]
    InvalidCapacity(SessionName),
}
