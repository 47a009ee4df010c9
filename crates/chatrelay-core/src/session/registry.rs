//! Live real-time connections attached to one session actor.
//!
//! Each connection is the sending half of a bounded queue drained by the
//! transport task (e.g. a WebSocket writer). Sends never wait: a closed or
//! full queue counts as a failed send, and the connection is dropped after
//! the broadcast pass that observed it. Dead connections therefore linger
//! until the next broadcast.

use tokio::sync::mpsc;
use uuid::Uuid;

use chatrelay_types::frame::OutboundFrame;
use chatrelay_types::message::Message;

/// Sending side of one attached real-time channel.
#[derive(Debug, Clone)]
pub struct Connection {
    id: Uuid,
    sender: mpsc::Sender<OutboundFrame>,
}

impl Connection {
    /// Create a connection and the receiver its transport task drains.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            Self {
                id: Uuid::now_v7(),
                sender,
            },
            receiver,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the transport side has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queue one frame without waiting.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), mpsc::error::TrySendError<OutboundFrame>> {
        self.sender.try_send(frame)
    }
}

/// The set of connections attached to a session actor. Not persisted.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Vec<Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection. Reconnects produce a new entry.
    pub fn add(&mut self, connection: Connection) {
        tracing::debug!(connection_id = %connection.id(), "Connection attached");
        self.connections.push(connection);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of connections whose transport is still open.
    pub fn open_count(&self) -> usize {
        self.connections.iter().filter(|c| !c.is_closed()).count()
    }

    /// Send the user frame then the assistant frame to every connection.
    ///
    /// Each connection is tried independently; connections that fail
    /// either send are removed after the pass. Returns how many connections
    /// received both frames.
    pub fn broadcast_pair(&mut self, user: &Message, assistant: &Message) -> usize {
        let before = self.connections.len();

        self.connections.retain(|connection| {
            let delivered = connection
                .send(OutboundFrame::Message {
                    message: user.clone(),
                })
                .and_then(|()| {
                    connection.send(OutboundFrame::Message {
                        message: assistant.clone(),
                    })
                });

            match delivered {
                Ok(()) => true,
                Err(err) => {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        error = %err,
                        "Dropping connection after failed send"
                    );
                    false
                }
            }
        });

        let delivered = self.connections.len();
        if delivered < before {
            tracing::info!(
                pruned = before - delivered,
                remaining = delivered,
                "Pruned dead connections"
            );
        }
        delivered
    }

    /// Send one frame to a single connection. Returns false if it could not be queued.
    pub fn send_to(&self, connection: &Connection, frame: OutboundFrame) -> bool {
        match connection.send(frame) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    error = %err,
                    "Failed to send frame to connection"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Message, Message) {
        (Message::user("hello", "u1"), Message::assistant("hi"))
    }

    fn content_of(frame: OutboundFrame) -> String {
        match frame {
            OutboundFrame::Message { message } => message.content,
            OutboundFrame::Error { error } => panic!("unexpected error frame: {error}"),
        }
    }

    #[tokio::test]
    async fn broadcast_delivers_user_then_assistant() {
        let mut registry = ConnectionRegistry::new();
        let (conn, mut rx) = Connection::channel(8);
        registry.add(conn);

        let (user, assistant) = pair();
        assert_eq!(registry.broadcast_pair(&user, &assistant), 1);

        assert_eq!(content_of(rx.recv().await.unwrap()), "hello");
        assert_eq!(content_of(rx.recv().await.unwrap()), "hi");
    }

    #[tokio::test]
    async fn broadcast_prunes_closed_connections() {
        let mut registry = ConnectionRegistry::new();
        let (alive, mut alive_rx) = Connection::channel(8);
        let (dead, dead_rx) = Connection::channel(8);
        registry.add(alive);
        registry.add(dead);
        drop(dead_rx);

        let (user, assistant) = pair();
        assert_eq!(registry.broadcast_pair(&user, &assistant), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(content_of(alive_rx.recv().await.unwrap()), "hello");
    }

    #[test]
    fn dead_connection_lingers_until_next_broadcast() {
        let mut registry = ConnectionRegistry::new();
        let (conn, rx) = Connection::channel(8);
        registry.add(conn);
        drop(rx);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.open_count(), 0);

        let (user, assistant) = pair();
        registry.broadcast_pair(&user, &assistant);
        assert!(registry.is_empty());
    }

    #[test]
    fn full_outbound_queue_drops_connection_without_blocking() {
        let mut registry = ConnectionRegistry::new();
        let (slow, _slow_rx) = Connection::channel(1);
        registry.add(slow);

        let (user, assistant) = pair();
        assert_eq!(registry.broadcast_pair(&user, &assistant), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn send_to_targets_single_connection() {
        let mut registry = ConnectionRegistry::new();
        let (a, mut a_rx) = Connection::channel(8);
        let (b, mut b_rx) = Connection::channel(8);
        registry.add(a.clone());
        registry.add(b);

        assert!(registry.send_to(
            &a,
            OutboundFrame::Error {
                error: "bad frame".to_string()
            }
        ));

        assert!(matches!(
            a_rx.recv().await.unwrap(),
            OutboundFrame::Error { .. }
        ));
        assert!(b_rx.try_recv().is_err());
    }

    #[test]
    fn connection_ids_are_unique() {
        let (a, _a_rx) = Connection::channel(1);
        let (b, _b_rx) = Connection::channel(1);
        assert_ne!(a.id(), b.id());
    }
}
