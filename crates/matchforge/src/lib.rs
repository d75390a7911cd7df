//! # Matchforge
//!
//! Session matchmaking and lifecycle coordination for multiplayer games.
//!
//! Matchforge keeps an authoritative in-memory registry of live game
//! sessions, searches it deterministically, and sequences the
//! asynchronous create / find / join / leave / destroy flows against a
//! pluggable session backend. You bring the backend (an
//! [`IdentityProvider`], a [`SessionProvider`], and a
//! [`TransportHandoff`]); Matchforge brings the bookkeeping.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matchforge::prelude::*;
//!
//! # async fn demo() -> Result<(), MatchforgeError> {
//! let mut mm = Matchmaker::<LoopbackIdentity>::builder()
//!     .build(LoopbackIdentity, LoopbackSessions, LoopbackHandoff);
//!
//! mm.login(0, &Credentials::account_portal()).await?;
//! let ticket = mm.create_session(SessionParams::new("Arena-1")).await?;
//! let completion = ticket.outcome().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod loopback;
mod matchmaker;

pub use error::MatchforgeError;
pub use loopback::{LoopbackHandoff, LoopbackIdentity, LoopbackSessions};
pub use matchmaker::{Matchmaker, MatchmakerBuilder};

pub use matchforge_coordinator::{
    spawn_coordinator, Completion, CoordinatorConfig, CoordinatorError,
    CoordinatorHandle, OpKind, OpOutput, OpRequest, OpState, OpTicket,
    ProviderError, RequestToken, SessionProvider, TransitionEvent,
    TransportHandoff,
};
pub use matchforge_identity::{
    Credentials, IdentityError, IdentityProvider, PlayerId, PlayerIdentity,
};
pub use matchforge_registry::{
    RegistryError, RegistryEvent, SessionName, SessionParams, SessionRecord,
    SessionRegistry,
};
pub use matchforge_search::{
    SearchEngine, SearchResult, SessionQuery, MAX_SEARCH_RESULTS,
};

/// Everything most callers need, in one import.
pub mod prelude {
    pub use crate::{
        Completion, CoordinatorConfig, Credentials, LoopbackHandoff,
        LoopbackIdentity, LoopbackSessions, MatchforgeError, Matchmaker,
        OpOutput, PlayerIdentity, SessionName, SessionParams, SessionQuery,
    };
}
