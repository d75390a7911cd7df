//! Lifecycle operation types: kinds, states, tickets, and events.

use std::fmt;

use matchforge_identity::PlayerId;
use matchforge_registry::{SessionName, SessionParams};
use matchforge_search::{SearchResult, SessionQuery};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::CoordinatorError;

// ---------------------------------------------------------------------------
// OpKind
// ---------------------------------------------------------------------------

/// The five lifecycle operation kinds.
///
/// Single-flight is enforced per (player, kind): a player can have a
/// find and a join pending at the same time, but never two joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Create,
    Destroy,
    Find,
    Join,
    Leave,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Destroy => write!(f, "Destroy"),
            Self::Find => write!(f, "Find"),
            Self::Join => write!(f, "Join"),
            Self::Leave => write!(f, "Leave"),
        }
    }
}

// ---------------------------------------------------------------------------
// OpState
// ---------------------------------------------------------------------------

/// Per-operation state machine:
///
/// ```text
/// Idle ──(issue)──→ Pending ──┬──→ Succeeded
///                             └──→ Failed
/// ```
///
/// - **Idle**: no operation of this kind in flight. Synchronous
///   rejections (single-flight conflict, failed precondition) stay here.
/// - **Pending**: the provider is working on it.
/// - **Succeeded / Failed**: terminal; reached only via the provider's
///   reply or the timeout. Reaching either clears the single-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpState {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl OpState {
    /// Returns `true` for the two terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Pending)
                | (Self::Pending, Self::Succeeded)
                | (Self::Pending, Self::Failed)
        )
    }
}

impl fmt::Display for OpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Pending => write!(f, "Pending"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestToken
// ---------------------------------------------------------------------------

/// Monotonically increasing tag for an issued operation.
///
/// Completions and deadlines are keyed by token, so a late provider
/// reply for a request that already timed out is recognised as stale
/// and discarded instead of terminating a newer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OpRequest
// ---------------------------------------------------------------------------

/// What the caller asked for, with its per-kind arguments.
#[derive(Debug, Clone)]
pub enum OpRequest {
    Create(SessionParams),
    Destroy(SessionName),
    Find(SessionQuery),
    Join(SessionName),
    Leave,
}

impl OpRequest {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Create(_) => OpKind::Create,
            Self::Destroy(_) => OpKind::Destroy,
            Self::Find(_) => OpKind::Find,
            Self::Join(_) => OpKind::Join,
            Self::Leave => OpKind::Leave,
        }
    }
}

// ---------------------------------------------------------------------------
// OpOutput / Completion
// ---------------------------------------------------------------------------

/// The success payload of a completed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutput {
    /// Session installed; the descriptor is ready for transport handoff.
    Created { connect: String },

    /// Session torn down and removed.
    Destroyed,

    /// Search finished. An empty result set is still a success.
    Found { result: SearchResult },

    /// Joined; the resolved descriptor is ready for transport handoff.
    /// Guaranteed non-empty — an empty resolution fails the join.
    Joined { connect: String },

    /// Left the session.
    Left,
}

/// The single completion notification delivered per accepted operation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub kind: OpKind,
    pub player: PlayerId,
    pub token: RequestToken,
    pub result: Result<OpOutput, CoordinatorError>,
}

impl Completion {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// ---------------------------------------------------------------------------
// OpTicket
// ---------------------------------------------------------------------------

/// A receipt for an accepted operation.
///
/// Issuing returns immediately with a ticket; the terminal outcome
/// arrives later through [`OpTicket::outcome`]. Dropping the ticket
/// doesn't cancel the operation — it only discards the notification.
#[derive(Debug)]
pub struct OpTicket {
    pub(crate) kind: OpKind,
    pub(crate) token: RequestToken,
    pub(crate) done: oneshot::Receiver<Completion>,
}

impl OpTicket {
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Waits for the operation to reach a terminal state.
    ///
    /// # Errors
    /// Returns [`CoordinatorError::Unavailable`] if the coordinator shut
    /// down before completing the operation.
    pub async fn outcome(self) -> Result<Completion, CoordinatorError> {
        self.done.await.map_err(|_| CoordinatorError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// TransitionEvent
// ---------------------------------------------------------------------------

/// One structured record per operation state transition, for
/// observability sinks (logging, UI). Not a formatted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub kind: OpKind,
    pub player: PlayerId,
    pub token: RequestToken,
    pub from: OpState,
    pub to: OpState,
    /// Failure reason, present on `Failed` transitions.
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_state_transitions_follow_machine() {
        assert!(OpState::Idle.can_transition_to(OpState::Pending));
        assert!(OpState::Pending.can_transition_to(OpState::Succeeded));
        assert!(OpState::Pending.can_transition_to(OpState::Failed));

        assert!(!OpState::Idle.can_transition_to(OpState::Succeeded));
        assert!(!OpState::Succeeded.can_transition_to(OpState::Pending));
        assert!(!OpState::Failed.can_transition_to(OpState::Succeeded));
    }

    #[test]
    fn test_op_state_is_terminal() {
        assert!(!OpState::Idle.is_terminal());
        assert!(!OpState::Pending.is_terminal());
        assert!(OpState::Succeeded.is_terminal());
        assert!(OpState::Failed.is_terminal());
    }

    #[test]
    fn test_op_request_kind_mapping() {
        assert_eq!(OpRequest::Leave.kind(), OpKind::Leave);
        assert_eq!(
            OpRequest::Destroy("Arena-1".into()).kind(),
            OpKind::Destroy
        );
        assert_eq!(
            OpRequest::Find(matchforge_search::SessionQuery::all()).kind(),
            OpKind::Find
        );
    }

    #[test]
    fn test_op_kind_display() {
        assert_eq!(OpKind::Create.to_string(), "Create");
        assert_eq!(OpKind::Leave.to_string(), "Leave");
    }
}
