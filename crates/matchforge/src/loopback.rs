//! Loopback implementations of the upstream hooks.
//!
//! These never touch a network: logins always succeed, session
//! operations are confirmed immediately, and descriptors resolve to a
//! synthetic loopback address. They back the CLI and are handy in
//! tests and local development. Never wire them into production.

use matchforge_coordinator::{
    ProviderError, SessionProvider, TransportHandoff,
};
use matchforge_identity::{
    Credentials, IdentityError, IdentityProvider, PlayerIdentity,
};
use matchforge_registry::{SessionName, SessionParams, SessionRecord};
use matchforge_search::SessionQuery;
use rand::Rng;

/// Accepts any credentials and mints a random player identity.
pub struct LoopbackIdentity;

impl IdentityProvider for LoopbackIdentity {
    async fn login(
        &self,
        local_user: u32,
        credentials: &Credentials,
    ) -> Result<PlayerIdentity, IdentityError> {
        let id = format!("loopback-{local_user}-{}", random_suffix());
        let display_name = if credentials.id.is_empty() {
            format!("Player {local_user}")
        } else {
            credentials.id.clone()
        };
        tracing::debug!(%id, %display_name, "loopback login");
        Ok(PlayerIdentity::new(id, display_name))
    }
}

/// Confirms every lifecycle operation without doing anything.
pub struct LoopbackSessions;

impl SessionProvider for LoopbackSessions {
    async fn create(
        &self,
        _params: SessionParams,
        _host: PlayerIdentity,
    ) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn find(&self, _query: SessionQuery) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn join(
        &self,
        _name: SessionName,
        _player: PlayerIdentity,
    ) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn teardown(
        &self,
        _name: SessionName,
        _player: PlayerIdentity,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Resolves the host's advertised descriptor, or synthesizes a loopback
/// one when the host advertised nothing. Resolution never fails.
pub struct LoopbackHandoff;

impl TransportHandoff for LoopbackHandoff {
    async fn resolve(&self, record: SessionRecord) -> String {
        if record.connect.is_empty() {
            format!("loopback://{}", record.name.as_str())
        } else {
            record.connect
        }
    }
}

/// Eight hex characters of randomness, enough to keep loopback player
/// ids distinct within a process.
fn random_suffix() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 4] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, connect: &str) -> SessionRecord {
        SessionRecord {
            name: name.into(),
            host: PlayerIdentity::new("h", "Host"),
            capacity: 5,
            occupancy: 0,
            advertised: true,
            tags: Default::default(),
            lobby: true,
            connect: connect.to_string(),
            created_seq: 1,
        }
    }

    #[tokio::test]
    async fn test_login_always_succeeds_with_unique_ids() {
        let identity = LoopbackIdentity;
        let creds = Credentials::account_portal();
        let a = identity.login(0, &creds).await.unwrap();
        let b = identity.login(0, &creds).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_login_uses_credential_id_as_display_name() {
        let identity = LoopbackIdentity;
        let mut creds = Credentials::account_portal();
        creds.id = "Hosta".to_string();
        let player = identity.login(0, &creds).await.unwrap();
        assert_eq!(player.display_name, "Hosta");
    }

    #[tokio::test]
    async fn test_handoff_echoes_advertised_descriptor() {
        let connect =
            LoopbackHandoff.resolve(record("Arena-1", "10.0.0.1:7777")).await;
        assert_eq!(connect, "10.0.0.1:7777");
    }

    #[tokio::test]
    async fn test_handoff_synthesizes_when_unadvertised() {
        let connect = LoopbackHandoff.resolve(record("Arena-1", "")).await;
        assert_eq!(connect, "loopback://Arena-1");
    }
}
