//! Upstream hooks: the session backend and the transport handoff.
//!
//! The coordinator never talks to a matchmaking service or opens a
//! network connection itself. It calls these traits and reacts to what
//! they return. Implement them against your online backend; tests and
//! the CLI use loopback implementations.

use std::future::Future;

use matchforge_identity::PlayerIdentity;
use matchforge_registry::{SessionName, SessionParams, SessionRecord};
use matchforge_search::SessionQuery;

/// An opaque upstream failure, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider failure: {0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// The session backend: fulfils the remote half of each lifecycle
/// operation.
///
/// Every method is asynchronous and may take arbitrarily long — the
/// coordinator guards each call with its own timeout, so a provider
/// that never answers cannot wedge an operation.
///
/// Arguments are owned so calls can be driven from spawned tasks.
pub trait SessionProvider: Send + Sync + 'static {
    /// Registers a new session upstream. On `Ok`, the coordinator
    /// installs the record into its registry.
    fn create(
        &self,
        params: SessionParams,
        host: PlayerIdentity,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Acknowledges a search. Real backends refresh their advertised
    /// session list here; the coordinator runs the actual filter against
    /// its registry once the provider confirms.
    fn find(
        &self,
        query: SessionQuery,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Reserves a slot in the named session for the player.
    fn join(
        &self,
        name: SessionName,
        player: PlayerIdentity,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Tears down the player's participation in the named session.
    /// Both leave (participant) and destroy (host) funnel through this
    /// single primitive; the coordinator decides what happens to the
    /// registry record afterwards.
    fn teardown(
        &self,
        name: SessionName,
        player: PlayerIdentity,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// Resolves a joined session to a connection descriptor.
///
/// The actual connect happens entirely outside this core — the
/// coordinator only checks that the descriptor is non-empty before
/// declaring the join ready for handoff.
pub trait TransportHandoff: Send + Sync + 'static {
    /// Returns the connection descriptor for the given session record.
    /// An empty string means resolution failed.
    fn resolve(
        &self,
        record: SessionRecord,
    ) -> impl Future<Output = String> + Send;
}
