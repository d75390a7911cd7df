//! Error types for the identity layer.

/// Errors that can occur during login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the credentials (bad token, cancelled
    /// portal flow, banned account, ...). The string is the provider's
    /// own reason, passed through opaquely.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// The identity backend could not be reached at all.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}
