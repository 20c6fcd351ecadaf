//! Websocket endpoint for the relay
//!
//! Browser widgets and the scene client both connect here. Inbound JSON
//! envelopes are routed through the hub; everything the hub delivers to this
//! client is written back as JSON text frames.

use super::AppState;
use crate::relay::{ClientId, Envelope, RelayHub};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};

pub async fn relay_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut subscription = state.relay.connect();
    let id = subscription.id();
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::debug!(client = %id, clients = state.relay.client_count(), "Relay socket open");

    loop {
        tokio::select! {
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&state.relay, id, &text);
                }
                Some(Ok(Message::Ping(payload))) => {
                    if ws_tx.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client = %id, error = %e, "Relay socket error");
                    break;
                }
            },
            outbound = subscription.recv() => {
                let Some(envelope) = outbound else { break };
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(client = %id, error = %e, "Failed to encode relay frame");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Route one inbound text frame; returns how many clients received it
fn handle_frame(hub: &RelayHub, origin: ClientId, text: &str) -> Option<usize> {
    match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => hub.route(origin, envelope),
        Err(e) => {
            tracing::debug!(client = %origin, error = %e, "Ignoring malformed relay frame");
            None
        }
    }
}
