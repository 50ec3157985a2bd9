//! WebSocket endpoint: one socket session per connected client.
//!
//! The session forwards decoded client frames to the gateway and writes the
//! connection's outbound events back to the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, warn};

use crate::app::AppState;
use crate::gateway::{ClientFrame, Connection, GatewayHandle};

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.gateway))
}

pub async fn handle_socket(socket: WebSocket, gateway: GatewayHandle) {
    let Connection { id, mut events } = match gateway.connect().await {
        Ok(connection) => connection,
        Err(e) => {
            warn!(error = %e, "Rejecting socket, gateway unavailable");
            return;
        }
    };

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(connection_id = %id, event = event.name(), error = %e, "Failed to serialize event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match ClientFrame::parse(&text) {
                        Ok(frame) => {
                            if gateway.dispatch(id, frame).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!(connection_id = %id, error = %e, "Dropping client frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(connection_id = %id, error = %e, "Socket error");
                        break;
                    }
                    // Ping/pong are answered by the runtime; binary frames are not part of the protocol.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    if let Err(e) = gateway.disconnect(id).await {
        debug!(connection_id = %id, error = %e, "Gateway gone before disconnect");
    }
}
