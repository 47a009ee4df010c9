//! The session actor: sole owner and serializer of one session.
//!
//! The actor runs as a tokio task draining a bounded command queue one
//! command at a time, so a submission's append, inference call, persist
//! and broadcast are never interleaved with another operation on the same
//! session. The inference call only suspends this session's queue.
//!
//! Lifecycle: the log is loaded by an explicit step before the first
//! command is processed and the `loaded` flag records success. A failed
//! load leaves the flag unset and is retried at the start of the next
//! operation. An actor that sits idle with no open connections closes its
//! queue, drains what was already queued, and exits; the hub spawns a
//! successor on demand, which waits for this actor's `finished` token
//! before touching the store.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use chatrelay_types::error::{RepositoryError, SessionError};
use chatrelay_types::frame::{FrameParseError, InboundFrame, OutboundFrame};
use chatrelay_types::message::Message;

use crate::inference::client::{InferenceClient, InferenceRequest};
use crate::inference::response::extract_text;
use crate::store::log_store::SessionLogStore;

use super::context::{build_prompt, context_window};
use super::fallback::{fallback_reply, finalize_reply};
use super::registry::{Connection, ConnectionRegistry};
use super::{ANONYMOUS_USER, SessionSettings, SubmitOutcome};

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// A request queued for a session actor.
pub(crate) enum SessionCommand {
    Submit {
        content: String,
        user_id: String,
        reply: Reply<SubmitOutcome>,
    },
    History {
        reply: Reply<Vec<Message>>,
    },
    Attach {
        connection: Connection,
        reply: Reply<()>,
    },
    Inbound {
        connection: Connection,
        raw: String,
    },
    Sweep {
        reply: Reply<usize>,
    },
}

/// Sending side of a running actor, held by the hub.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    pub(crate) commands: mpsc::Sender<SessionCommand>,
    /// Cancelled once the actor task has fully exited.
    pub(crate) finished: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Everything needed to start one actor.
pub(crate) struct SpawnArgs<S, I> {
    pub(crate) session_id: Arc<str>,
    pub(crate) store: Arc<S>,
    pub(crate) inference: Arc<I>,
    pub(crate) settings: SessionSettings,
    /// Finished token of the actor this one replaces, if any.
    pub(crate) predecessor: Option<CancellationToken>,
    pub(crate) shutdown: CancellationToken,
}

pub struct SessionActor<S, I> {
    session_id: Arc<str>,
    store: Arc<S>,
    inference: Arc<I>,
    settings: SessionSettings,
    log: Vec<Message>,
    loaded: bool,
    connections: ConnectionRegistry,
    commands: mpsc::Receiver<SessionCommand>,
}

impl<S: SessionLogStore, I: InferenceClient> SessionActor<S, I> {
    pub(crate) fn spawn(args: SpawnArgs<S, I>) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(args.settings.command_buffer);
        let finished = CancellationToken::new();

        let span = tracing::info_span!("session", session_id = %args.session_id);
        let actor = Self {
            session_id: args.session_id,
            store: args.store,
            inference: args.inference,
            settings: args.settings,
            log: Vec::new(),
            loaded: false,
            connections: ConnectionRegistry::new(),
            commands: commands_rx,
        };

        tokio::spawn(
            actor
                .run(args.predecessor, args.shutdown, finished.clone())
                .instrument(span),
        );

        SessionHandle {
            commands: commands_tx,
            finished,
        }
    }

    async fn run(
        mut self,
        predecessor: Option<CancellationToken>,
        shutdown: CancellationToken,
        finished: CancellationToken,
    ) {
        let _finished = finished.drop_guard();

        if let Some(predecessor) = predecessor {
            predecessor.cancelled().await;
        }

        if let Err(err) = self.ensure_loaded().await {
            tracing::warn!(error = %err, "Initial session load failed, retrying on next command");
        }

        let idle_timeout = self.settings.idle_timeout;
        let evict_when_idle = !idle_timeout.is_zero();
        let idle = tokio::time::sleep(idle_timeout);
        tokio::pin!(idle);

        let sweep_every = self.settings.sweep_interval;
        let mut sweep_timer = tokio::time::interval_at(Instant::now() + sweep_every, sweep_every);
        sweep_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    tracing::debug!("Shutdown requested");
                    break;
                }

                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command).await;
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                }

                _ = sweep_timer.tick() => {
                    if let Err(err) = self.sweep().await {
                        tracing::warn!(error = %err, "Scheduled sweep failed");
                    }
                }

                _ = &mut idle, if evict_when_idle => {
                    if self.connections.open_count() == 0 {
                        tracing::info!("Session idle, stopping actor");
                        break;
                    }
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                }
            }
        }

        // Commands accepted before the queue closed still get an answer.
        // Attachments are refused so the hub hands them to the successor.
        self.commands.close();
        while let Some(command) = self.commands.recv().await {
            match command {
                SessionCommand::Attach { reply, .. } => {
                    let _ = reply.send(Err(SessionError::ActorUnavailable));
                }
                command => self.handle(command).await,
            }
        }

        tracing::info!(messages = self.log.len(), "Session actor stopped");
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Submit {
                content,
                user_id,
                reply,
            } => {
                let _ = reply.send(self.submit(content, user_id).await);
            }
            SessionCommand::History { reply } => {
                let _ = reply.send(self.history().await);
            }
            SessionCommand::Attach { connection, reply } => {
                self.connections.add(connection);
                let _ = reply.send(Ok(()));
            }
            SessionCommand::Inbound { connection, raw } => {
                self.on_inbound(&connection, &raw).await;
            }
            SessionCommand::Sweep { reply } => {
                let _ = reply.send(self.sweep().await);
            }
        }
    }

    async fn ensure_loaded(&mut self) -> Result<(), SessionError> {
        if self.loaded {
            return Ok(());
        }

        self.log = self.store.load(&self.session_id).await?.unwrap_or_default();
        self.loaded = true;
        tracing::info!(messages = self.log.len(), "Session log loaded");
        Ok(())
    }

    /// Write the whole log, retrying once before giving up.
    async fn persist(&self) -> Result<(), RepositoryError> {
        match self.store.save(&self.session_id, &self.log).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "Persisting session log failed, retrying once");
                self.store.save(&self.session_id, &self.log).await
            }
        }
    }

    async fn submit(
        &mut self,
        content: String,
        user_id: String,
    ) -> Result<SubmitOutcome, SessionError> {
        if content.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        self.ensure_loaded().await?;

        let checkpoint = self.log.len();
        let user_message = Message::user(content, user_id);
        self.log.push(user_message.clone());

        let window = context_window(&self.log, self.settings.context_window);
        let prompt = build_prompt(window, &user_message.content);
        let reply = self.generate_reply(prompt).await;

        let assistant_message = Message::assistant(reply);
        self.log.push(assistant_message.clone());

        if let Err(err) = self.persist().await {
            self.log.truncate(checkpoint);
            tracing::error!(error = %err, "Submission rolled back, log not persisted");
            return Err(err.into());
        }

        let delivered = self
            .connections
            .broadcast_pair(&user_message, &assistant_message);
        tracing::debug!(
            delivered,
            messages = self.log.len(),
            "Submission persisted and broadcast"
        );

        Ok(SubmitOutcome {
            user_message,
            assistant_message,
            history: self.log.clone(),
        })
    }

    /// Ask the model for a reply. Failures become fallback text, never errors.
    async fn generate_reply(&self, prompt: String) -> String {
        let request = InferenceRequest::new(prompt, &self.settings.inference);

        let result = self
            .inference
            .complete(&request)
            .await
            .and_then(|body| extract_text(&body));

        match result {
            Ok(text) => finalize_reply(&text),
            Err(err) => {
                tracing::warn!(
                    backend = self.inference.name(),
                    error = %err,
                    "Inference failed, substituting fallback reply"
                );
                fallback_reply(&err)
            }
        }
    }

    async fn history(&mut self) -> Result<Vec<Message>, SessionError> {
        self.ensure_loaded().await?;
        Ok(self.log.clone())
    }

    /// Apply the retention policy. Returns the number of messages removed.
    async fn sweep(&mut self) -> Result<usize, SessionError> {
        self.ensure_loaded().await?;

        let Some(trimmed) = self.settings.retention.trim(&self.log) else {
            return Ok(0);
        };

        let previous = std::mem::replace(&mut self.log, trimmed);
        if let Err(err) = self.persist().await {
            self.log = previous;
            return Err(err.into());
        }

        let removed = previous.len() - self.log.len();
        tracing::info!(removed, kept = self.log.len(), "Session log trimmed");
        Ok(removed)
    }

    async fn on_inbound(&mut self, connection: &Connection, raw: &str) {
        match InboundFrame::parse(raw) {
            Ok(InboundFrame::Chat { message, user_id }) => {
                let user_id = user_id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| ANONYMOUS_USER.to_string());

                if let Err(err) = self.submit(message, user_id).await {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        error = %err,
                        "Real-time submission failed"
                    );
                    self.connections.send_to(
                        connection,
                        OutboundFrame::Error {
                            error: err.to_string(),
                        },
                    );
                }
            }
            Err(FrameParseError::Malformed(reason)) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    %reason,
                    "Malformed real-time frame"
                );
                self.connections.send_to(
                    connection,
                    OutboundFrame::Error {
                        error: format!("malformed frame: {reason}"),
                    },
                );
            }
            Err(FrameParseError::Unrecognized(reason)) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    %reason,
                    "Ignoring unrecognized real-time frame"
                );
            }
        }
    }
}
