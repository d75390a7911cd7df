//! Player identity for Matchforge.
//!
//! This crate answers one question: WHO is the local player?
//!
//! - **Types** ([`PlayerId`], [`PlayerIdentity`], [`Credentials`]) — the
//!   data that describes a logged-in player.
//! - **Provider hook** ([`IdentityProvider`]) — the trait your identity
//!   backend implements. Matchforge never talks to an account system
//!   itself; it calls your provider and trusts the identity it returns.
//! - **Errors** ([`IdentityError`]) — what can go wrong during login.

mod error;
mod provider;
mod types;

pub use error::IdentityError;
pub use provider::IdentityProvider;
pub use types::{Credentials, PlayerId, PlayerIdentity};
