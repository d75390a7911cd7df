//! Session lifecycle coordination for Matchforge.
//!
//! The coordinator sequences the asynchronous steps of each lifecycle
//! operation (create / destroy / find / join / leave) and converts the
//! upstream provider's replies into a single completion per operation.
//!
//! # Key types
//!
//! - [`spawn_coordinator`] — start the coordinator actor task
//! - [`CoordinatorHandle`] — issue operations, subscribe to events
//! - [`OpTicket`] / [`Completion`] — the awaitable result of an issue
//! - [`SessionProvider`] / [`TransportHandoff`] — the upstream hooks
//! - [`CoordinatorConfig`] — timeout and chaining policy
//!
//! # Guarantees
//!
//! - **Single-flight**: at most one pending operation of a given kind
//!   per player; a second issue of that kind is rejected synchronously.
//! - **No stuck operations**: a configurable timeout forces any pending
//!   operation to fail if the provider never answers.
//! - **Owner-task discipline**: the registry is mutated only on the
//!   coordinator's actor task; provider replies are marshaled back onto
//!   it through the actor channel.

mod config;
mod coordinator;
mod error;
mod op;
mod provider;

pub use config::CoordinatorConfig;
pub use coordinator::{spawn_coordinator, CoordinatorHandle};
pub use error::CoordinatorError;
pub use op::{
    Completion, OpKind, OpOutput, OpRequest, OpState, OpTicket, RequestToken,
    TransitionEvent,
};
pub use provider::{ProviderError, SessionProvider, TransportHandoff};
