//! WebSocket handler for real-time session traffic.
//!
//! The `/api/ws/{session_id}` endpoint upgrades an HTTP connection to a
//! WebSocket and attaches it to the session's actor. Once connected, the
//! handler:
//!
//! - **Forwards frames:** drains the connection's outbound queue and pushes
//!   each frame to the client as a JSON text message.
//! - **Relays input:** hands every text message to the actor unparsed; the
//!   actor validates it and replies on this connection if needed.
//!
//! Attaching does not replay history; clients fetch it over HTTP.
//! Disconnecting only drops the outbound receiver; the actor prunes the
//! connection on its next broadcast.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

/// Upgrade an HTTP request to a WebSocket connection for one session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, session_id))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex the actor's outbound frames and
/// incoming client messages in a single task.
async fn handle_ws_connection(socket: WebSocket, state: AppState, session_id: String) {
    let (connection, mut outbound) = match state.hub.attach(&session_id).await {
        Ok(attached) => attached,
        Err(err) => {
            tracing::warn!(%session_id, error = %err, "Failed to attach WebSocket");
            return;
        }
    };
    let connection_id = connection.id();
    tracing::info!(%session_id, %connection_id, "WebSocket attached");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            // --- Branch 1: Forward actor frames to the client ---
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json.into())).await.is_err() {
                            // Client disconnected
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%connection_id, "Failed to serialize outbound frame: {err}");
                    }
                }
            }

            // --- Branch 2: Relay client messages to the actor ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        let raw = text.as_str().to_owned();
                        if let Err(err) = state.hub.inbound(&session_id, &connection, raw).await {
                            tracing::warn!(%connection_id, error = %err, "Session unavailable, closing WebSocket");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!(%connection_id, "WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(%session_id, %connection_id, "WebSocket closed");
}
