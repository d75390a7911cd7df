//! Error types for the lifecycle coordinator.

use matchforge_identity::PlayerId;
use matchforge_registry::{RegistryError, SessionName};

use crate::provider::ProviderError;
use crate::OpKind;

/// Errors that can occur while coordinating lifecycle operations.
///
/// Precondition failures (`SingleFlightConflict`, `Unauthorized`,
/// `NotJoined`, and the wrapped registry errors) are returned
/// synchronously at issue time — the operation never becomes pending.
/// `Timeout`, `ResolutionFailed`, and `ProviderFailure` only ever arrive
/// through the completion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// An operation of this kind is already pending for this player.
    /// Re-issue after the pending one reaches a terminal state.
    #[error("player {player} already has a pending {kind} operation")]
    SingleFlightConflict { player: PlayerId, kind: OpKind },

    /// Only the host may destroy a session.
    #[error("player {player} is not the host of session {name}")]
    Unauthorized { player: PlayerId, name: SessionName },

    /// The player is not in any session, so there is nothing to leave.
    #[error("player {0} has not joined a session")]
    NotJoined(PlayerId),

    /// The provider reported a successful join but the transport
    /// handoff produced an empty connection descriptor. The join is
    /// failed rather than silently left unusable.
    #[error("no connection descriptor could be resolved for session {0}")]
    ResolutionFailed(SessionName),

    /// The provider did not answer within the configured window.
    #[error("{0} operation timed out")]
    Timeout(OpKind),

    /// An opaque upstream failure, passed through.
    #[error(transparent)]
    ProviderFailure(#[from] ProviderError),

    /// A registry precondition or invariant rejected the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The coordinator has shut down; no further operations complete.
    #[error("coordinator is unavailable")]
    Unavailable,
}

impl CoordinatorError {
    /// Returns `true` for failures detected synchronously at issue time,
    /// as opposed to failures reported through the completion.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::SingleFlightConflict { .. }
                | Self::Unauthorized { .. }
                | Self::NotJoined(_)
                | Self::Registry(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        let player = PlayerId::new("p");
        assert!(CoordinatorError::SingleFlightConflict {
            player: player.clone(),
            kind: OpKind::Find,
        }
        .is_precondition());
        assert!(CoordinatorError::NotJoined(player).is_precondition());
        assert!(CoordinatorError::Registry(RegistryError::NotFound(
            "Ghost".into()
        ))
        .is_precondition());

        assert!(!CoordinatorError::Timeout(OpKind::Join).is_precondition());
        assert!(!CoordinatorError::ResolutionFailed("Arena-1".into())
            .is_precondition());
        assert!(!CoordinatorError::Unavailable.is_precondition());
    }

    #[test]
    fn test_registry_error_converts_via_from() {
        let err: CoordinatorError =
            RegistryError::AlreadyExists("Arena-1".into()).into();
        assert!(matches!(err, CoordinatorError::Registry(_)));
        assert!(err.to_string().contains("Arena-1"));
    }
}
