//! Per-key routing of session commands to their actors.
//!
//! The hub holds at most one live actor per session identifier. Lookups
//! spawn an actor on first use and replace one that has exited, handing the
//! replacement the previous actor's `finished` token so the two never touch
//! the store at the same time.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use chatrelay_types::error::SessionError;
use chatrelay_types::frame::OutboundFrame;
use chatrelay_types::message::Message;

use crate::inference::client::InferenceClient;
use crate::store::log_store::SessionLogStore;

use super::actor::{SessionActor, SessionCommand, SessionHandle, SpawnArgs};
use super::registry::Connection;
use super::{SessionSettings, SubmitOutcome};

/// Attempts made to hand a command to a live actor.
const DISPATCH_ATTEMPTS: usize = 2;

pub struct SessionHub<S, I> {
    sessions: DashMap<String, SessionHandle>,
    store: Arc<S>,
    inference: Arc<I>,
    settings: SessionSettings,
    shutdown: CancellationToken,
}

impl<S: SessionLogStore, I: InferenceClient> SessionHub<S, I> {
    pub fn new(store: Arc<S>, inference: Arc<I>, settings: SessionSettings) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            inference,
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn inference(&self) -> &Arc<I> {
        &self.inference
    }

    /// Append a user message, generate the reply, persist and broadcast.
    pub async fn submit(
        &self,
        session_id: &str,
        content: String,
        user_id: String,
    ) -> Result<SubmitOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(
            session_id,
            SessionCommand::Submit {
                content,
                user_id,
                reply,
            },
        )
        .await?;
        rx.await.map_err(|_| SessionError::ActorUnavailable)?
    }

    /// Full message log, oldest first.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Message>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(session_id, SessionCommand::History { reply })
            .await?;
        rx.await.map_err(|_| SessionError::ActorUnavailable)?
    }

    /// Run the retention policy now. Returns the number of messages removed.
    pub async fn sweep(&self, session_id: &str) -> Result<usize, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(session_id, SessionCommand::Sweep { reply })
            .await?;
        rx.await.map_err(|_| SessionError::ActorUnavailable)?
    }

    /// Register a new real-time connection with the session.
    ///
    /// Resolves once a running actor has registered the connection. Returns
    /// the connection (needed to route inbound frames) and the
    /// receiver the transport task must drain.
    pub async fn attach(
        &self,
        session_id: &str,
    ) -> Result<(Connection, mpsc::Receiver<OutboundFrame>), SessionError> {
        let (connection, receiver) = Connection::channel(self.settings.outbound_buffer);
        for attempt in 1..=DISPATCH_ATTEMPTS {
            let (reply, rx) = oneshot::channel();
            self.dispatch(
                session_id,
                SessionCommand::Attach {
                    connection: connection.clone(),
                    reply,
                },
            )
            .await?;
            match rx.await {
                Ok(Ok(())) => return Ok((connection, receiver)),
                // The actor was stopping when the attachment arrived.
                Ok(Err(_)) | Err(_) => {
                    tracing::debug!(session_id, attempt, "Attachment refused, retrying");
                }
            }
        }
        Err(SessionError::ActorUnavailable)
    }

    /// Queue a raw inbound frame from `connection`.
    ///
    /// Returns once the frame is queued; any reply travels on the
    /// connection's outbound channel.
    pub async fn inbound(
        &self,
        session_id: &str,
        connection: &Connection,
        raw: String,
    ) -> Result<(), SessionError> {
        self.dispatch(
            session_id,
            SessionCommand::Inbound {
                connection: connection.clone(),
                raw,
            },
        )
        .await
    }

    /// Number of sessions with a running actor.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| !entry.value().is_closed())
            .count()
    }

    /// Stop every actor after it drains its queued commands.
    pub fn shutdown(&self) {
        tracing::info!(sessions = self.sessions.len(), "Shutting down session actors");
        self.shutdown.cancel();
    }

    async fn dispatch(&self, session_id: &str, command: SessionCommand) -> Result<(), SessionError> {
        let mut command = command;
        for attempt in 1..=DISPATCH_ATTEMPTS {
            let handle = self.handle_for(session_id)?;
            match handle.commands.send(command).await {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    tracing::debug!(session_id, attempt, "Session actor exited, respawning");
                    command = returned;
                }
            }
        }
        Err(SessionError::ActorUnavailable)
    }

    /// The live handle for `session_id`, spawning or replacing its actor.
    fn handle_for(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        if self.shutdown.is_cancelled() {
            return Err(SessionError::ActorUnavailable);
        }

        // Fast path; the read guard must be released before `entry`.
        if let Some(handle) = self.sessions.get(session_id) {
            if !handle.is_closed() {
                return Ok(handle.clone());
            }
        }

        self.prune_finished();

        let handle = match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_closed() {
                    let predecessor = occupied.get().finished.clone();
                    occupied.insert(self.spawn_actor(session_id, Some(predecessor)));
                }
                occupied.get().clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(self.spawn_actor(session_id, None))
                .clone(),
        };
        Ok(handle)
    }

    /// Drop handles of actors that have fully exited.
    ///
    /// Handles that are closed but still draining stay, since a successor
    /// must wait on their `finished` token.
    fn prune_finished(&self) {
        self.sessions
            .retain(|_, handle| !handle.finished.is_cancelled());
    }

    fn spawn_actor(&self, session_id: &str, predecessor: Option<CancellationToken>) -> SessionHandle {
        tracing::debug!(session_id, respawn = predecessor.is_some(), "Spawning session actor");
        SessionActor::spawn(SpawnArgs {
            session_id: Arc::from(session_id),
            store: self.store.clone(),
            inference: self.inference.clone(),
            settings: self.settings.clone(),
            predecessor,
            shutdown: self.shutdown.clone(),
        })
    }
}
