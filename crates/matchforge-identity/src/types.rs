//! Identity types: who a player is and how they log in.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A stable, opaque identifier for a player.
///
/// Newtype over `String` — identity backends issue opaque account ids
/// (not small integers), so we keep whatever the provider gave us and
/// never interpret it. The newtype still buys type safety: a session
/// name can't be passed where a player id is expected.
///
/// `#[serde(transparent)]` serializes this as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Creates a player id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// PlayerIdentity
// ---------------------------------------------------------------------------

/// A logged-in player: stable id plus the name shown to other players.
///
/// Created by an [`IdentityProvider`](crate::IdentityProvider) at login
/// and immutable afterwards — if the display name changes upstream, the
/// player logs in again and gets a fresh identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Stable opaque id issued by the identity backend.
    pub id: PlayerId,

    /// Human-readable name for UI and logs.
    pub display_name: String,
}

impl PlayerIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(id),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Login credentials handed to the identity provider.
///
/// The shape mirrors account-portal style flows: an optional account id,
/// an opaque token, and a `kind` string naming the flow. Matchforge never
/// inspects these fields — they exist so the provider can route the login.
/// No passwords travel through this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account id, when the flow needs one. Often empty for portal flows.
    pub id: String,

    /// Opaque auth token (exchange code, refresh token, ...).
    pub token: String,

    /// Which login flow to use, e.g. `"accountportal"`.
    pub kind: String,
}

impl Credentials {
    /// Credentials for an interactive account-portal login: the provider
    /// opens its own UI and no id/token is supplied up front.
    pub fn account_portal() -> Self {
        Self {
            id: String::new(),
            token: String::new(),
            kind: "accountportal".to_string(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::account_portal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("acct-7f")).unwrap();
        assert_eq!(json, "\"acct-7f\"");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId::new("7f").to_string(), "P-7f");
    }

    #[test]
    fn test_credentials_default_is_account_portal() {
        let creds = Credentials::default();
        assert_eq!(creds.kind, "accountportal");
        assert!(creds.id.is_empty());
        assert!(creds.token.is_empty());
    }

    #[test]
    fn test_player_identity_display_shows_name_and_id() {
        let identity = PlayerIdentity::new("abc", "Rook");
        assert_eq!(identity.to_string(), "Rook (P-abc)");
    }
}
