//! Authoritative in-memory session store for Matchforge.
//!
//! The registry is the single source of truth for which sessions exist,
//! who hosts them, and how full they are. Everything else (search,
//! lifecycle coordination) reads from or mutates this store.
//!
//! # Key types
//!
//! - [`SessionRegistry`] — the store itself
//! - [`SessionRecord`] — one advertised session
//! - [`SessionParams`] — caller-supplied settings for a new session
//! - [`RegistryEvent`] — emitted on every successful mutation
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. This is intentional: the registry is
//! owned by a single task (the lifecycle coordinator's actor loop) and
//! all mutation is marshaled onto that task. Keeping it simple here
//! avoids hidden locking overhead.

mod error;
mod record;
mod registry;

pub use error::RegistryError;
pub use record::{SessionName, SessionParams, SessionRecord};
pub use registry::{RegistryEvent, SessionRegistry};
