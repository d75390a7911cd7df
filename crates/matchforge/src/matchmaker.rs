//! `Matchmaker` builder and login-gated front-end.
//!
//! The matchmaker ties the layers together: identity → coordinator →
//! registry/search. It tracks one logged-in local player and issues
//! lifecycle operations on their behalf; anything fancier (multiple
//! local players, custom chaining) can drop down to the
//! [`CoordinatorHandle`] directly.

use matchforge_coordinator::{
    spawn_coordinator, CoordinatorConfig, CoordinatorHandle, OpTicket,
    SessionProvider, TransportHandoff,
};
use matchforge_identity::{Credentials, IdentityProvider, PlayerIdentity};
use matchforge_registry::{SessionName, SessionParams};
use matchforge_search::SessionQuery;

use crate::MatchforgeError;

/// Builder for configuring and starting a [`Matchmaker`].
///
/// # Example
///
/// ```rust,no_run
/// use matchforge::prelude::*;
/// use matchforge::{LoopbackHandoff, LoopbackIdentity, LoopbackSessions};
///
/// let mm = Matchmaker::<LoopbackIdentity>::builder()
///     .auto_join(true)
///     .build(LoopbackIdentity, LoopbackSessions, LoopbackHandoff);
/// ```
pub struct MatchmakerBuilder {
    config: CoordinatorConfig,
}

impl MatchmakerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CoordinatorConfig::default(),
        }
    }

    /// Replaces the whole coordinator configuration.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the per-operation timeout.
    pub fn op_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.op_timeout = timeout;
        self
    }

    /// When enabled, a successful find chains a join against its first
    /// result.
    pub fn auto_join(mut self, auto_join: bool) -> Self {
        self.config.auto_join = auto_join;
        self
    }

    /// Builds the matchmaker, spawning its coordinator.
    pub fn build<I, P, H>(
        self,
        identity: I,
        provider: P,
        handoff: H,
    ) -> Matchmaker<I>
    where
        I: IdentityProvider,
        P: SessionProvider,
        H: TransportHandoff,
    {
        let coordinator = spawn_coordinator(self.config, provider, handoff);
        Matchmaker {
            identity,
            coordinator,
            player: None,
        }
    }
}

impl Default for MatchmakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A login-gated matchmaking front-end for one local player.
///
/// Every lifecycle method requires a prior successful [`login`]
/// (mirroring online backends, where session calls without a signed-in
/// user fail outright) and returns an [`OpTicket`] whose outcome arrives
/// asynchronously.
///
/// [`login`]: Matchmaker::login
pub struct Matchmaker<I: IdentityProvider> {
    identity: I,
    coordinator: CoordinatorHandle,
    player: Option<PlayerIdentity>,
}

impl<I: IdentityProvider> Matchmaker<I> {
    /// Creates a new builder.
    pub fn builder() -> MatchmakerBuilder {
        MatchmakerBuilder::new()
    }

    /// Logs the local player in through the identity provider.
    ///
    /// A repeat login replaces the current identity; operations issued
    /// before the switch still complete under the old one.
    pub async fn login(
        &mut self,
        local_user: u32,
        credentials: &Credentials,
    ) -> Result<&PlayerIdentity, MatchforgeError> {
        let player = self.identity.login(local_user, credentials).await?;
        tracing::info!(player = %player, "logged in");
        Ok(self.player.insert(player))
    }

    /// The currently logged-in player, if any.
    pub fn player(&self) -> Option<&PlayerIdentity> {
        self.player.as_ref()
    }

    /// The underlying coordinator handle, for event subscriptions or
    /// issuing operations as other identities.
    pub fn handle(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    /// Opens a new session hosted by the logged-in player.
    pub async fn create_session(
        &self,
        params: SessionParams,
    ) -> Result<OpTicket, MatchforgeError> {
        let player = self.current()?;
        Ok(self.coordinator.create(player, params).await?)
    }

    /// Searches for sessions matching the query.
    pub async fn find_sessions(
        &self,
        query: SessionQuery,
    ) -> Result<OpTicket, MatchforgeError> {
        let player = self.current()?;
        Ok(self.coordinator.find(player, query).await?)
    }

    /// Joins the named session.
    pub async fn join_session(
        &self,
        name: SessionName,
    ) -> Result<OpTicket, MatchforgeError> {
        let player = self.current()?;
        Ok(self.coordinator.join(player, name).await?)
    }

    /// Leaves the session the player currently occupies.
    pub async fn leave_session(&self) -> Result<OpTicket, MatchforgeError> {
        let player = self.current()?;
        Ok(self.coordinator.leave(player).await?)
    }

    /// Destroys the named session. The logged-in player must host it.
    pub async fn destroy_session(
        &self,
        name: SessionName,
    ) -> Result<OpTicket, MatchforgeError> {
        let player = self.current()?;
        Ok(self.coordinator.destroy(player, name).await?)
    }

    fn current(&self) -> Result<PlayerIdentity, MatchforgeError> {
        self.player.clone().ok_or(MatchforgeError::NotLoggedIn)
    }
}
