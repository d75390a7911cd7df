//! Unified error type for the Matchforge meta-crate.

use matchforge_coordinator::CoordinatorError;
use matchforge_identity::IdentityError;
use matchforge_registry::RegistryError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `matchforge` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchforgeError {
    /// An identity-level error (login failed, provider down).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A registry-level error (duplicate, missing, capacity).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A coordination-level error (conflict, timeout, provider).
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// A lifecycle operation was attempted before logging in.
    #[error("not logged in: call login() before issuing operations")]
    NotLoggedIn,
}

impl MatchforgeError {
    /// Returns `true` for failures detected before anything became
    /// pending — the caller's request was rejected, not attempted.
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Registry(_) => true,
            Self::Coordinator(e) => e.is_precondition(),
            Self::Identity(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchforge_coordinator::OpKind;
    use matchforge_identity::PlayerId;

    #[test]
    fn test_from_identity_error() {
        let err = IdentityError::LoginFailed("bad token".into());
        let mf_err: MatchforgeError = err.into();
        assert!(matches!(mf_err, MatchforgeError::Identity(_)));
        assert!(mf_err.to_string().contains("bad token"));
    }

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::NotFound("Arena-1".into());
        let mf_err: MatchforgeError = err.into();
        assert!(matches!(mf_err, MatchforgeError::Registry(_)));
    }

    #[test]
    fn test_from_coordinator_error() {
        let err = CoordinatorError::Timeout(OpKind::Join);
        let mf_err: MatchforgeError = err.into();
        assert!(matches!(mf_err, MatchforgeError::Coordinator(_)));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(MatchforgeError::NotLoggedIn.is_precondition());
        assert!(MatchforgeError::Coordinator(
            CoordinatorError::NotJoined(PlayerId::new("p"))
        )
        .is_precondition());
        assert!(!MatchforgeError::Coordinator(CoordinatorError::Timeout(
            OpKind::Find
        ))
        .is_precondition());
    }
}
