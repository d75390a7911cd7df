//! Session record types: what the registry stores.

use std::collections::BTreeSet;
use std::fmt;

use matchforge_identity::PlayerIdentity;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionName
// ---------------------------------------------------------------------------

/// The unique key of a session.
///
/// Same newtype pattern as `PlayerId` — a named wrapper over `String`
/// so a session name can't be confused with any other string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(pub String);

impl SessionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

impl From<&str> for SessionName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SessionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// ---------------------------------------------------------------------------
// SessionParams
// ---------------------------------------------------------------------------

/// Caller-supplied settings for a session about to be created.
///
/// The defaults match a typical public lobby: 5 open slots, advertised,
/// lobby-style presence discovery enabled. Override individual fields
/// with the builder methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Unique session name — the registry key.
    pub name: SessionName,

    /// Maximum occupancy. Must be > 0.
    pub capacity: u32,

    /// Whether the session shows up in searches at all.
    pub advertised: bool,

    /// Keyword tags the session is discoverable under.
    pub tags: BTreeSet<String>,

    /// Whether the session is a presence-discoverable lobby.
    pub lobby: bool,

    /// Opaque connection descriptor advertised by the host. Resolved
    /// into an actual connect target at join time by the transport
    /// handoff.
    pub connect: String,
}

impl SessionParams {
    /// Creates params with the default public-lobby shape.
    pub fn new(name: impl Into<SessionName>) -> Self {
        Self {
            name: name.into(),
            capacity: 5,
            advertised: true,
            tags: BTreeSet::new(),
            lobby: true,
            connect: String::new(),
        }
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn advertised(mut self, advertised: bool) -> Self {
        self.advertised = advertised;
        self
    }

    pub fn lobby(mut self, lobby: bool) -> Self {
        self.lobby = lobby;
        self
    }

    pub fn connect(mut self, connect: impl Into<String>) -> Self {
        self.connect = connect.into();
        self
    }
}

impl From<&str> for SessionParams {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// One live session as stored in the registry.
///
/// Invariants (enforced by the registry, not by this type):
/// - `occupancy <= capacity`, always
/// - `name` is unique within the registry
/// - the host has at most one record at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session name.
    pub name: SessionName,

    /// Who created (and owns) the session.
    pub host: PlayerIdentity,

    /// Maximum occupancy. Always > 0.
    pub capacity: u32,

    /// Players currently joined. Starts at 0; the host's own presence
    /// is not counted.
    pub occupancy: u32,

    /// Whether the session shows up in searches.
    pub advertised: bool,

    /// Keyword tags for discovery.
    pub tags: BTreeSet<String>,

    /// Whether this is a presence-discoverable lobby.
    pub lobby: bool,

    /// Opaque connection descriptor for the transport handoff.
    pub connect: String,

    /// Registry-assigned insertion counter. Strictly increasing per
    /// registry; used as the deterministic ordering key for searches.
    pub created_seq: u64,
}

impl SessionRecord {
    /// Returns `true` if the record carries the given keyword tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Returns `true` if no join slots remain.
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_display() {
        assert_eq!(SessionName::new("Arena-1").to_string(), "S-Arena-1");
    }

    #[test]
    fn test_session_params_defaults_are_public_lobby() {
        let params = SessionParams::new("Arena-1");
        assert_eq!(params.capacity, 5);
        assert!(params.advertised);
        assert!(params.lobby);
        assert!(params.tags.is_empty());
        assert!(params.connect.is_empty());
    }

    #[test]
    fn test_session_params_builder_overrides() {
        let params = SessionParams::new("Arena-1")
            .capacity(12)
            .tag("ranked")
            .lobby(false)
            .advertised(false)
            .connect("10.0.0.1:7777");
        assert_eq!(params.capacity, 12);
        assert!(params.tags.contains("ranked"));
        assert!(!params.lobby);
        assert!(!params.advertised);
        assert_eq!(params.connect, "10.0.0.1:7777");
    }
}
