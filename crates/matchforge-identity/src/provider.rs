//! The login hook for plugging in an identity backend.
//!
//! Matchforge doesn't implement authentication itself — that belongs to
//! your account system (a platform SDK, an OAuth portal, a dev stub).
//! This module defines the [`IdentityProvider`] trait: one async method
//! that takes credentials and returns a [`PlayerIdentity`] or an error.

use crate::{Credentials, IdentityError, PlayerIdentity};

/// Logs a local user in and returns their identity.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider is shared across async tasks.
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the coordinator that holds it.
///
/// # Example
///
/// ```rust
/// use matchforge_identity::{
///     Credentials, IdentityError, IdentityProvider, PlayerIdentity,
/// };
///
/// /// Accepts everyone and derives the id from the user index.
/// /// Only for development — never use this in production!
/// struct DevIdentity;
///
/// impl IdentityProvider for DevIdentity {
///     async fn login(
///         &self,
///         local_user: u32,
///         _credentials: &Credentials,
///     ) -> Result<PlayerIdentity, IdentityError> {
///         Ok(PlayerIdentity::new(
///             format!("dev-{local_user}"),
///             format!("Player {local_user}"),
///         ))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Logs in the local user at the given index with the given
    /// credentials.
    ///
    /// # Returns
    /// - `Ok(PlayerIdentity)` — who they are, including display name
    /// - `Err(IdentityError)` — the login was rejected or the backend
    ///   is unreachable
    fn login(
        &self,
        local_user: u32,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<PlayerIdentity, IdentityError>> + Send;
}
