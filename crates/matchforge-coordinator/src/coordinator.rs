//! The coordinator actor: an isolated Tokio task that owns the registry.
//!
//! The actor processes commands from a cloneable [`CoordinatorHandle`]
//! and from its own spawned worker tasks (provider calls, descriptor
//! resolution, deadlines), all through one mpsc channel. Registry
//! mutation therefore happens on exactly one task — no shared mutable
//! state, just message passing.

use std::collections::HashMap;
use std::sync::Arc;

use matchforge_identity::{PlayerId, PlayerIdentity};
use matchforge_registry::{
    RegistryEvent, SessionName, SessionParams, SessionRegistry,
};
use matchforge_search::{SearchEngine, SessionQuery};
use tokio::sync::{mpsc, oneshot};

use crate::{
    Completion, CoordinatorConfig, CoordinatorError, OpKind, OpOutput,
    OpRequest, OpState, OpTicket, ProviderError, RequestToken,
    SessionProvider, TransitionEvent, TransportHandoff,
};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands processed by the coordinator actor.
///
/// `Issue` comes from handles; the rest are posted by the actor's own
/// worker tasks to marshal asynchronous results back onto the owner task.
pub(crate) enum Command {
    /// Issue a lifecycle operation for a player.
    Issue {
        player: PlayerIdentity,
        request: OpRequest,
        reply: oneshot::Sender<Result<OpTicket, CoordinatorError>>,
    },

    /// The provider finished (or failed) the upstream half of an
    /// operation.
    ProviderDone {
        player: PlayerId,
        kind: OpKind,
        token: RequestToken,
        result: Result<(), ProviderError>,
    },

    /// The transport handoff produced a connection descriptor for a
    /// pending join. Empty means resolution failed.
    Resolved {
        player: PlayerId,
        token: RequestToken,
        connect: String,
    },

    /// The per-operation timeout elapsed.
    Deadline {
        player: PlayerId,
        kind: OpKind,
        token: RequestToken,
    },

    /// Subscribe to operation state transitions.
    SubscribeTransitions {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<TransitionEvent>>,
    },

    /// Subscribe to registry mutations.
    SubscribeRegistry {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<RegistryEvent>>,
    },

    /// Shut down the coordinator.
    Shutdown,
}

// ---------------------------------------------------------------------------
// CoordinatorHandle
// ---------------------------------------------------------------------------

/// Handle to a running coordinator. Cheap to clone — an `mpsc::Sender`
/// wrapper.
///
/// Every lifecycle method returns immediately once the synchronous
/// precondition check passes; the terminal outcome arrives through the
/// returned [`OpTicket`].
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Issues a create for a new session hosted by `host`.
    pub async fn create(
        &self,
        host: PlayerIdentity,
        params: SessionParams,
    ) -> Result<OpTicket, CoordinatorError> {
        self.issue(host, OpRequest::Create(params)).await
    }

    /// Issues a search for sessions matching `query`.
    pub async fn find(
        &self,
        player: PlayerIdentity,
        query: SessionQuery,
    ) -> Result<OpTicket, CoordinatorError> {
        self.issue(player, OpRequest::Find(query)).await
    }

    /// Issues a join against the named session.
    pub async fn join(
        &self,
        player: PlayerIdentity,
        name: SessionName,
    ) -> Result<OpTicket, CoordinatorError> {
        self.issue(player, OpRequest::Join(name)).await
    }

    /// Issues a leave from the player's current session.
    pub async fn leave(
        &self,
        player: PlayerIdentity,
    ) -> Result<OpTicket, CoordinatorError> {
        self.issue(player, OpRequest::Leave).await
    }

    /// Issues a destroy of the named session. The caller must be its
    /// host.
    pub async fn destroy(
        &self,
        player: PlayerIdentity,
        name: SessionName,
    ) -> Result<OpTicket, CoordinatorError> {
        self.issue(player, OpRequest::Destroy(name)).await
    }

    /// Issues an arbitrary lifecycle request.
    pub async fn issue(
        &self,
        player: PlayerIdentity,
        request: OpRequest,
    ) -> Result<OpTicket, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Issue {
                player,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    /// Subscribes to operation state transitions.
    pub async fn transitions(
        &self,
    ) -> Result<mpsc::UnboundedReceiver<TransitionEvent>, CoordinatorError>
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::SubscribeTransitions { reply: reply_tx })
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    /// Subscribes to registry mutation events.
    pub async fn registry_events(
        &self,
    ) -> Result<mpsc::UnboundedReceiver<RegistryEvent>, CoordinatorError>
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::SubscribeRegistry { reply: reply_tx })
            .await
            .map_err(|_| CoordinatorError::Unavailable)?;
        reply_rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    /// Tells the coordinator to shut down. Pending operations never
    /// complete; their tickets resolve to `Unavailable`.
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        self.sender
            .send(Command::Shutdown)
            .await
            .map_err(|_| CoordinatorError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Actor internals
// ---------------------------------------------------------------------------

/// One pending operation.
struct InFlight {
    token: RequestToken,
    player: PlayerIdentity,
    request: OpRequest,
    /// The session the operation acts on, when the request itself
    /// doesn't carry one (Leave resolves its target at issue time).
    session: Option<SessionName>,
    done: oneshot::Sender<Completion>,
}

/// The coordinator actor state. Runs inside a Tokio task.
struct Coordinator<P: SessionProvider, H: TransportHandoff> {
    config: CoordinatorConfig,
    registry: SessionRegistry,
    search: SearchEngine,
    provider: Arc<P>,
    handoff: Arc<H>,

    /// Pending operations. At most one entry per (player, kind) —
    /// the single-flight invariant.
    in_flight: HashMap<(PlayerId, OpKind), InFlight>,

    /// Which session each non-host participant currently occupies.
    joined: HashMap<PlayerId, SessionName>,

    /// Transition event subscribers. Pruned when closed.
    subscribers: Vec<mpsc::UnboundedSender<TransitionEvent>>,

    next_token: u64,

    /// Sender side of our own channel, cloned into worker tasks so
    /// their results are marshaled back onto this task.
    outbound: mpsc::Sender<Command>,
    receiver: mpsc::Receiver<Command>,
}

impl<P: SessionProvider, H: TransportHandoff> Coordinator<P, H> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!("lifecycle coordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Issue {
                    player,
                    request,
                    reply,
                } => {
                    let result = self.issue(player, request);
                    let _ = reply.send(result);
                }
                Command::ProviderDone {
                    player,
                    kind,
                    token,
                    result,
                } => {
                    self.on_provider_done(player, kind, token, result);
                }
                Command::Resolved {
                    player,
                    token,
                    connect,
                } => {
                    self.on_resolved(player, token, connect);
                }
                Command::Deadline {
                    player,
                    kind,
                    token,
                } => {
                    self.on_deadline(player, kind, token);
                }
                Command::SubscribeTransitions { reply } => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    self.subscribers.push(tx);
                    let _ = reply.send(rx);
                }
                Command::SubscribeRegistry { reply } => {
                    let _ = reply.send(self.registry.subscribe());
                }
                Command::Shutdown => {
                    tracing::info!("coordinator shutting down");
                    break;
                }
            }
        }

        tracing::info!("lifecycle coordinator stopped");
    }

    // -- Issue path ---------------------------------------------------------

    /// Runs the synchronous half of an operation: single-flight check,
    /// preconditions, then dispatch to the provider.
    fn issue(
        &mut self,
        player: PlayerIdentity,
        request: OpRequest,
    ) -> Result<OpTicket, CoordinatorError> {
        let kind = request.kind();
        let key = (player.id.clone(), kind);

        if self.in_flight.contains_key(&key) {
            tracing::debug!(
                player = %player.id, %kind,
                "rejected: operation already pending"
            );
            return Err(CoordinatorError::SingleFlightConflict {
                player: player.id,
                kind,
            });
        }

        let session = self.check_preconditions(&player, &request)?;

        let token = RequestToken(self.next_token);
        self.next_token += 1;
        let (done_tx, done_rx) = oneshot::channel();

        self.spawn_provider_call(&player, &request, &session, token);
        self.spawn_deadline(player.id.clone(), kind, token);

        self.in_flight.insert(
            key,
            InFlight {
                token,
                player: player.clone(),
                request,
                session,
                done: done_tx,
            },
        );
        self.transition(
            kind,
            player.id,
            token,
            OpState::Idle,
            OpState::Pending,
            None,
        );

        Ok(OpTicket {
            kind,
            token,
            done: done_rx,
        })
    }

    /// Validates the request against current state. Returns the session
    /// the operation acts on, where that is resolved at issue time.
    fn check_preconditions(
        &self,
        player: &PlayerIdentity,
        request: &OpRequest,
    ) -> Result<Option<SessionName>, CoordinatorError> {
        match request {
            OpRequest::Create(params) => {
                if params.capacity == 0 {
                    return Err(matchforge_registry::RegistryError::InvalidCapacity(
                        params.name.clone(),
                    )
                    .into());
                }
                if self.registry.lookup(&params.name).is_some() {
                    return Err(matchforge_registry::RegistryError::AlreadyExists(
                        params.name.clone(),
                    )
                    .into());
                }
                if let Some(existing) = self.registry.host_session(&player.id) {
                    return Err(matchforge_registry::RegistryError::AlreadyExists(
                        existing.clone(),
                    )
                    .into());
                }
                Ok(None)
            }

            OpRequest::Destroy(name) => {
                let record = self.registry.lookup(name).ok_or_else(|| {
                    matchforge_registry::RegistryError::NotFound(name.clone())
                })?;
                if record.host.id != player.id {
                    return Err(CoordinatorError::Unauthorized {
                        player: player.id.clone(),
                        name: name.clone(),
                    });
                }
                Ok(Some(name.clone()))
            }

            OpRequest::Join(name) => {
                let record = self.registry.lookup(name).ok_or_else(|| {
                    matchforge_registry::RegistryError::NotFound(name.clone())
                })?;
                if let Some(current) = self.joined.get(&player.id) {
                    return Err(matchforge_registry::RegistryError::AlreadyExists(
                        current.clone(),
                    )
                    .into());
                }
                if record.is_full() {
                    return Err(matchforge_registry::RegistryError::CapacityExceeded(
                        name.clone(),
                    )
                    .into());
                }
                Ok(Some(name.clone()))
            }

            OpRequest::Leave => {
                let name = self
                    .joined
                    .get(&player.id)
                    .cloned()
                    .ok_or_else(|| {
                        CoordinatorError::NotJoined(player.id.clone())
                    })?;
                Ok(Some(name))
            }

            OpRequest::Find(_) => Ok(None),
        }
    }

    /// Spawns the upstream provider call; its result is posted back as
    /// a `ProviderDone` command.
    fn spawn_provider_call(
        &self,
        player: &PlayerIdentity,
        request: &OpRequest,
        session: &Option<SessionName>,
        token: RequestToken,
    ) {
        let provider = Arc::clone(&self.provider);
        let tx = self.outbound.clone();
        let player = player.clone();
        let request = request.clone();
        let session = session.clone();
        let kind = request.kind();

        tokio::spawn(async move {
            let result = match request {
                OpRequest::Create(params) => {
                    provider.create(params, player.clone()).await
                }
                OpRequest::Find(query) => provider.find(query).await,
                OpRequest::Join(name) => {
                    provider.join(name, player.clone()).await
                }
                OpRequest::Destroy(name) => {
                    provider.teardown(name, player.clone()).await
                }
                OpRequest::Leave => {
                    let name =
                        session.expect("leave target resolved at issue");
                    provider.teardown(name, player.clone()).await
                }
            };
            let _ = tx
                .send(Command::ProviderDone {
                    player: player.id,
                    kind,
                    token,
                    result,
                })
                .await;
        });
    }

    /// Spawns the timeout watchdog for an accepted operation.
    fn spawn_deadline(
        &self,
        player: PlayerId,
        kind: OpKind,
        token: RequestToken,
    ) {
        let tx = self.outbound.clone();
        let timeout = self.config.op_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx
                .send(Command::Deadline {
                    player,
                    kind,
                    token,
                })
                .await;
        });
    }

    // -- Completion path ------------------------------------------------

    /// Handles the provider's reply for a pending operation.
    fn on_provider_done(
        &mut self,
        player: PlayerId,
        kind: OpKind,
        token: RequestToken,
        result: Result<(), ProviderError>,
    ) {
        let key = (player.clone(), kind);
        match self.in_flight.get(&key) {
            Some(flight) if flight.token == token => {}
            _ => {
                tracing::debug!(
                    %player, %kind, %token,
                    "stale provider reply discarded"
                );
                return;
            }
        }

        // A confirmed join isn't terminal yet: the descriptor still has
        // to resolve. Keep the slot until `Resolved` (or the deadline).
        if kind == OpKind::Join && result.is_ok() {
            self.start_join_resolution(key);
            return;
        }

        let flight = self.in_flight.remove(&key).expect("checked above");
        let request = flight.request.clone();

        match (request, result) {
            (_, Err(e)) => {
                self.finish(flight, Err(CoordinatorError::ProviderFailure(e)));
            }

            (OpRequest::Create(params), Ok(())) => {
                let host = flight.player.clone();
                match self.registry.create(params, host) {
                    Ok(record) => {
                        let connect = record.connect.clone();
                        self.finish(
                            flight,
                            Ok(OpOutput::Created { connect }),
                        );
                    }
                    Err(e) => self.finish(flight, Err(e.into())),
                }
            }

            (OpRequest::Find(query), Ok(())) => {
                let result = self.search.search(&self.registry, &query);
                let chain_to = if self.config.auto_join {
                    result.first().map(|r| r.name.clone())
                } else {
                    None
                };
                let player = flight.player.clone();
                self.finish(flight, Ok(OpOutput::Found { result }));

                if let Some(name) = chain_to {
                    self.auto_join(player, name);
                }
            }

            (OpRequest::Destroy(name), Ok(())) => {
                match self.registry.destroy(&name) {
                    Ok(_) => {
                        // Anyone who was in the session is no longer
                        // joined to anything.
                        self.joined.retain(|_, n| *n != name);
                        self.finish(flight, Ok(OpOutput::Destroyed));
                    }
                    Err(e) => self.finish(flight, Err(e.into())),
                }
            }

            (OpRequest::Leave, Ok(())) => {
                let name = flight
                    .session
                    .clone()
                    .expect("leave target resolved at issue");
                match self.registry.update_occupancy(&name, -1) {
                    Ok(_) => {
                        self.joined.remove(&flight.player.id);
                        self.finish(flight, Ok(OpOutput::Left));
                    }
                    Err(e) => self.finish(flight, Err(e.into())),
                }
            }

            (OpRequest::Join(_), Ok(())) => {
                // Handled above before the slot was removed.
            }
        }
    }

    /// Kicks off descriptor resolution for a provider-confirmed join.
    fn start_join_resolution(&mut self, key: (PlayerId, OpKind)) {
        let flight = self.in_flight.get(&key).expect("checked by caller");
        let name = flight
            .session
            .clone()
            .expect("join always has a target");
        let token = flight.token;

        let Some(record) = self.registry.lookup(&name) else {
            // The session vanished while the provider was working.
            let flight =
                self.in_flight.remove(&key).expect("checked by caller");
            self.finish(
                flight,
                Err(matchforge_registry::RegistryError::NotFound(name).into()),
            );
            return;
        };

        let record = record.clone();
        let handoff = Arc::clone(&self.handoff);
        let tx = self.outbound.clone();
        let player = key.0;
        tokio::spawn(async move {
            let connect = handoff.resolve(record).await;
            let _ = tx
                .send(Command::Resolved {
                    player,
                    token,
                    connect,
                })
                .await;
        });
    }

    /// Handles the transport handoff's descriptor for a pending join.
    fn on_resolved(
        &mut self,
        player: PlayerId,
        token: RequestToken,
        connect: String,
    ) {
        let key = (player.clone(), OpKind::Join);
        match self.in_flight.get(&key) {
            Some(flight) if flight.token == token => {}
            _ => {
                tracing::debug!(
                    %player, %token,
                    "stale descriptor resolution discarded"
                );
                return;
            }
        }

        let flight = self.in_flight.remove(&key).expect("checked above");
        let name = flight
            .session
            .clone()
            .expect("join always has a target");

        if connect.is_empty() {
            self.finish(
                flight,
                Err(CoordinatorError::ResolutionFailed(name)),
            );
            return;
        }

        match self.registry.update_occupancy(&name, 1) {
            Ok(_) => {
                self.joined.insert(flight.player.id.clone(), name);
                self.finish(flight, Ok(OpOutput::Joined { connect }));
            }
            Err(e) => self.finish(flight, Err(e.into())),
        }
    }

    /// Handles an elapsed operation timeout.
    fn on_deadline(
        &mut self,
        player: PlayerId,
        kind: OpKind,
        token: RequestToken,
    ) {
        let key = (player, kind);
        match self.in_flight.get(&key) {
            Some(flight) if flight.token == token => {}
            // Already terminal — the common case.
            _ => return,
        }

        let flight = self.in_flight.remove(&key).expect("checked above");
        self.finish(flight, Err(CoordinatorError::Timeout(kind)));
    }

    /// Issues the chained join after a successful find.
    fn auto_join(&mut self, player: PlayerIdentity, name: SessionName) {
        match self.issue(player.clone(), OpRequest::Join(name.clone())) {
            Ok(ticket) => {
                // Nobody holds this ticket; the outcome is observable
                // through transition events.
                tracing::debug!(
                    player = %player.id, %name, token = %ticket.token(),
                    "auto-join issued"
                );
            }
            Err(e) => {
                tracing::warn!(
                    player = %player.id, %name, error = %e,
                    "auto-join skipped"
                );
            }
        }
    }

    // -- Terminal handling ------------------------------------------------

    /// Drives a pending operation to its terminal state: notify the
    /// ticket holder and emit the transition. The single-flight slot is
    /// already cleared by the caller, so cleanup happens even if the
    /// ticket receiver is gone.
    fn finish(
        &mut self,
        flight: InFlight,
        result: Result<OpOutput, CoordinatorError>,
    ) {
        let kind = flight.request.kind();
        let to = if result.is_ok() {
            OpState::Succeeded
        } else {
            OpState::Failed
        };
        let reason = result.as_ref().err().map(|e| e.to_string());

        let completion = Completion {
            kind,
            player: flight.player.id.clone(),
            token: flight.token,
            result,
        };
        let _ = flight.done.send(completion);

        self.transition(
            kind,
            flight.player.id,
            flight.token,
            OpState::Pending,
            to,
            reason,
        );
    }

    /// Emits one structured event per state transition.
    fn transition(
        &mut self,
        kind: OpKind,
        player: PlayerId,
        token: RequestToken,
        from: OpState,
        to: OpState,
        reason: Option<String>,
    ) {
        tracing::info!(
            %kind, %player, %token, %from, %to,
            reason = reason.as_deref().unwrap_or(""),
            "lifecycle transition"
        );

        let event = TransitionEvent {
            kind,
            player,
            token,
            from,
            to,
            reason,
        };
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Spawns a coordinator actor task and returns a handle to it.
///
/// The coordinator owns a fresh, empty registry; sessions enter it only
/// through successful create operations.
pub fn spawn_coordinator<P, H>(
    config: CoordinatorConfig,
    provider: P,
    handoff: H,
) -> CoordinatorHandle
where
    P: SessionProvider,
    H: TransportHandoff,
{
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = Coordinator {
        config,
        registry: SessionRegistry::new(),
        search: SearchEngine::new(),
        provider: Arc::new(provider),
        handoff: Arc::new(handoff),
        in_flight: HashMap::new(),
        joined: HashMap::new(),
        subscribers: Vec::new(),
        next_token: 1,
        outbound: tx.clone(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    CoordinatorHandle { sender: tx }
}
