//! The session registry: tracks every live session.
//!
//! This is the central piece of the storage layer. It's responsible for:
//! - Creating records when a session is confirmed
//! - Enforcing name uniqueness and the one-session-per-host rule
//! - Keeping occupancy within `0..=capacity`
//! - Emitting an event on every successful mutation
//!
//! Mutations are atomic with respect to each other because the registry
//! is owned by a single task — a record is never visible half-created.

use std::collections::HashMap;

use matchforge_identity::{PlayerId, PlayerIdentity};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{RegistryError, SessionName, SessionParams, SessionRecord};

// ---------------------------------------------------------------------------
// RegistryEvent
// ---------------------------------------------------------------------------

/// Emitted to subscribers on every successful registry mutation.
///
/// Failed operations emit nothing — subscribers only ever see changes
/// that actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// A session was created.
    Created { name: SessionName },

    /// A session was destroyed.
    Destroyed { name: SessionName },

    /// A session's occupancy changed to the given value.
    OccupancyChanged { name: SessionName, occupancy: u32 },
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// The authoritative store of live sessions.
///
/// Two maps kept in sync: `sessions` keyed by name, and a `hosts` index
/// from player id to the session they host. The index exists so the
/// one-session-per-host invariant is an O(1) check, not a scan.
pub struct SessionRegistry {
    /// All live sessions, keyed by name.
    sessions: HashMap<SessionName, SessionRecord>,

    /// Maps each host to the session they currently own.
    /// A player hosts at most ONE session at a time (key invariant).
    hosts: HashMap<PlayerId, SessionName>,

    /// Event subscribers. Closed receivers are pruned on the next emit.
    subscribers: Vec<mpsc::UnboundedSender<RegistryEvent>>,

    /// Insertion counter for deterministic search ordering.
    next_seq: u64,
}

impl SessionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            hosts: HashMap::new(),
            subscribers: Vec::new(),
            next_seq: 1,
        }
    }

    /// Subscribes to registry events. Events are delivered in mutation
    /// order. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RegistryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Creates a session record from the given params, hosted by `host`.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidCapacity`] — `params.capacity` is 0
    /// - [`RegistryError::AlreadyExists`] — the name is taken, or the
    ///   host already owns a live session
    pub fn create(
        &mut self,
        params: SessionParams,
        host: PlayerIdentity,
    ) -> Result<&SessionRecord, RegistryError> {
        if params.capacity == 0 {
            return Err(RegistryError::InvalidCapacity(params.name));
        }
        if self.sessions.contains_key(&params.name) {
            return Err(RegistryError::AlreadyExists(params.name));
        }
        if let Some(existing) = self.hosts.get(&host.id) {
            return Err(RegistryError::AlreadyExists(existing.clone()));
        }

        let name = params.name.clone();
        let record = SessionRecord {
            name: name.clone(),
            host: host.clone(),
            capacity: params.capacity,
            occupancy: 0,
            advertised: params.advertised,
            tags: params.tags,
            lobby: params.lobby,
            connect: params.connect,
            created_seq: self.next_seq,
        };
        self.next_seq += 1;

        // Insert into both maps to keep them in sync.
        self.hosts.insert(host.id.clone(), name.clone());
        self.sessions.insert(name.clone(), record);

        tracing::info!(%name, host = %host.id, "session created");
        self.emit(RegistryEvent::Created { name: name.clone() });

        Ok(self.sessions.get(&name).expect("just inserted"))
    }

    /// Removes a session and returns its final record.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no such session exists;
    /// in that case no event is emitted.
    pub fn destroy(
        &mut self,
        name: &SessionName,
    ) -> Result<SessionRecord, RegistryError> {
        let record = self
            .sessions
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;

        self.hosts.remove(&record.host.id);

        tracing::info!(%name, "session destroyed");
        self.emit(RegistryEvent::Destroyed { name: name.clone() });

        Ok(record)
    }

    /// Looks up a session by name.
    pub fn lookup(&self, name: &SessionName) -> Option<&SessionRecord> {
        self.sessions.get(name)
    }

    /// Adjusts a session's occupancy by `delta` and returns the new value.
    ///
    /// The change is applied only if it keeps occupancy within
    /// `0..=capacity` — a rejected change leaves the record untouched.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] — no such session
    /// - [`RegistryError::CapacityExceeded`] — would exceed capacity
    /// - [`RegistryError::OccupancyUnderflow`] — would drop below zero
    pub fn update_occupancy(
        &mut self,
        name: &SessionName,
        delta: i64,
    ) -> Result<u32, RegistryError> {
        let record = self
            .sessions
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.clone()))?;

        let next = i64::from(record.occupancy) + delta;
        if next < 0 {
            return Err(RegistryError::OccupancyUnderflow(name.clone()));
        }
        if next > i64::from(record.capacity) {
            return Err(RegistryError::CapacityExceeded(name.clone()));
        }

        record.occupancy = next as u32;
        let occupancy = record.occupancy;

        tracing::debug!(%name, occupancy, "occupancy changed");
        self.emit(RegistryEvent::OccupancyChanged {
            name: name.clone(),
            occupancy,
        });

        Ok(occupancy)
    }

    /// Returns a snapshot of every live session, ordered by insertion.
    ///
    /// The snapshot is owned — callers never hold references into the
    /// registry across other operations.
    pub fn all_active(&self) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> =
            self.sessions.values().cloned().collect();
        records.sort_by_key(|r| r.created_seq);
        records
    }

    /// Returns the name of the session the player hosts, if any.
    pub fn host_session(&self, player: &PlayerId) -> Option<&SessionName> {
        self.hosts.get(player)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Delivers an event to all subscribers, pruning closed ones.
    fn emit(&mut self, event: RegistryEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn host(n: u32) -> PlayerIdentity {
        PlayerIdentity::new(format!("acct-{n}"), format!("Player {n}"))
    }

    fn arena(name: &str) -> SessionParams {
        SessionParams::new(name).capacity(5).tag("arena")
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[test]
    fn test_create_then_lookup_returns_fresh_record() {
        let mut reg = SessionRegistry::new();

        reg.create(arena("Arena-1"), host(1)).expect("should succeed");

        let record = reg.lookup(&"Arena-1".into()).expect("should exist");
        assert_eq!(record.occupancy, 0);
        assert_eq!(record.capacity, 5);
        assert_eq!(record.host.id, PlayerId::new("acct-1"));
    }

    #[test]
    fn test_create_duplicate_name_fails_and_preserves_original() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1").capacity(5), host(1)).unwrap();

        let result = reg.create(arena("Arena-1").capacity(9), host(2));

        assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
        // The original record must be unmodified.
        let record = reg.lookup(&"Arena-1".into()).unwrap();
        assert_eq!(record.capacity, 5);
        assert_eq!(record.host.id, PlayerId::new("acct-1"));
    }

    #[test]
    fn test_create_while_already_hosting_fails() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1"), host(1)).unwrap();

        let result = reg.create(arena("Arena-2"), host(1));

        assert!(
            matches!(result, Err(RegistryError::AlreadyExists(n)) if n == "Arena-1".into()),
            "host must destroy their session before creating another"
        );
        assert!(reg.lookup(&"Arena-2".into()).is_none());
    }

    #[test]
    fn test_create_zero_capacity_fails() {
        let mut reg = SessionRegistry::new();

        let result = reg.create(arena("Arena-1").capacity(0), host(1));

        assert!(matches!(result, Err(RegistryError::InvalidCapacity(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_create_assigns_increasing_sequence_numbers() {
        let mut reg = SessionRegistry::new();
        let seq1 = reg.create(arena("A"), host(1)).unwrap().created_seq;
        let seq2 = reg.create(arena("B"), host(2)).unwrap().created_seq;

        assert!(seq2 > seq1);
    }

    // =====================================================================
    // destroy()
    // =====================================================================

    #[test]
    fn test_destroy_removes_record_and_frees_host() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1"), host(1)).unwrap();

        reg.destroy(&"Arena-1".into()).expect("should succeed");

        assert!(reg.lookup(&"Arena-1".into()).is_none());
        // The host can now create again.
        reg.create(arena("Arena-2"), host(1))
            .expect("host slot should be freed by destroy");
    }

    #[test]
    fn test_destroy_unknown_session_fails_without_event() {
        let mut reg = SessionRegistry::new();
        let mut events = reg.subscribe();

        let result = reg.destroy(&"Ghost".into());

        assert!(
            matches!(result, Err(RegistryError::NotFound(n)) if n == "Ghost".into())
        );
        assert!(
            events.try_recv().is_err(),
            "failed destroy must not emit an event"
        );
    }

    // =====================================================================
    // update_occupancy()
    // =====================================================================

    #[test]
    fn test_update_occupancy_tracks_joins_and_leaves() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1").capacity(2), host(1)).unwrap();
        let name: SessionName = "Arena-1".into();

        assert_eq!(reg.update_occupancy(&name, 1).unwrap(), 1);
        assert_eq!(reg.update_occupancy(&name, 1).unwrap(), 2);
        assert_eq!(reg.update_occupancy(&name, -1).unwrap(), 1);
    }

    #[test]
    fn test_update_occupancy_never_exceeds_capacity() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1").capacity(1), host(1)).unwrap();
        let name: SessionName = "Arena-1".into();
        reg.update_occupancy(&name, 1).unwrap();

        let result = reg.update_occupancy(&name, 1);

        assert!(matches!(result, Err(RegistryError::CapacityExceeded(_))));
        // The rejected change must leave occupancy untouched.
        assert_eq!(reg.lookup(&name).unwrap().occupancy, 1);
    }

    #[test]
    fn test_update_occupancy_never_drops_below_zero() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1"), host(1)).unwrap();
        let name: SessionName = "Arena-1".into();

        let result = reg.update_occupancy(&name, -1);

        assert!(matches!(result, Err(RegistryError::OccupancyUnderflow(_))));
        assert_eq!(reg.lookup(&name).unwrap().occupancy, 0);
    }

    #[test]
    fn test_update_occupancy_unknown_session_fails() {
        let mut reg = SessionRegistry::new();

        let result = reg.update_occupancy(&"Ghost".into(), 1);

        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    // =====================================================================
    // all_active() / host_session()
    // =====================================================================

    #[test]
    fn test_all_active_returns_insertion_order() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("C"), host(1)).unwrap();
        reg.create(arena("A"), host(2)).unwrap();
        reg.create(arena("B"), host(3)).unwrap();

        let names: Vec<String> = reg
            .all_active()
            .iter()
            .map(|r| r.name.as_str().to_string())
            .collect();

        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_host_session_reflects_ownership() {
        let mut reg = SessionRegistry::new();
        reg.create(arena("Arena-1"), host(1)).unwrap();

        assert_eq!(
            reg.host_session(&PlayerId::new("acct-1")),
            Some(&"Arena-1".into())
        );
        assert_eq!(reg.host_session(&PlayerId::new("acct-2")), None);
    }

    // =====================================================================
    // Events
    // =====================================================================

    #[test]
    fn test_events_emitted_in_mutation_order() {
        let mut reg = SessionRegistry::new();
        let mut events = reg.subscribe();
        let name: SessionName = "Arena-1".into();

        reg.create(arena("Arena-1"), host(1)).unwrap();
        reg.update_occupancy(&name, 1).unwrap();
        reg.destroy(&name).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::Created { name: name.clone() }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::OccupancyChanged {
                name: name.clone(),
                occupancy: 1
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            RegistryEvent::Destroyed { name }
        );
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut reg = SessionRegistry::new();
        let events = reg.subscribe();
        drop(events);

        // Must not panic or error even though the receiver is gone.
        reg.create(arena("Arena-1"), host(1)).unwrap();
        assert_eq!(reg.len(), 1);
    }
}
