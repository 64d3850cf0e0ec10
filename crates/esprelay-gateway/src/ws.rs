//! Per-connection WebSocket pump.
//!
//! Each accepted socket registers with the hub and then runs a single
//! select loop: one arm drains the hub queue into the socket, the other
//! parses inbound frames and dispatches them. The hub registration is
//! dropped on every exit path, so a vanished client never lingers in
//! the fan-out set.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use esprelay_core::ClientId;
use esprelay_hub::ClientEvent;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use tracing::{debug, info, warn};

use crate::server::AppState;

/// WebSocket upgrade handler.
pub(crate) async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Probe the limit before upgrading so over-limit clients get a
    // plain 503 instead of an accepted-then-dropped socket. The guard
    // borrows the limiter and cannot ride through the upgrade closure,
    // so the connection task re-acquires its own slot.
    let guard = match state.limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!(
                current = state.limiter.current_count(),
                max = state.max_connections,
                "WebSocket connection limit reached"
            );
            return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
        }
    };
    drop(guard);

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Handle a WebSocket connection until either side closes it.
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let _guard = match state.limiter.try_acquire() {
        Some(guard) => guard,
        None => {
            warn!("Connection limit reached during upgrade");
            return;
        }
    };

    let (client, mut hub_rx) = state.hub.connect();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            queued = hub_rx.recv() => {
                match queued {
                    Some(text) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            debug!(client = %client, "Failed to send, client disconnected");
                            break;
                        }
                    }
                    // Hub dropped the sender, the client was evicted.
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_client_frame(&state, client, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(client = %client, "Client sent close frame");
                        break;
                    }
                    // Pings are answered by axum; binary frames are not
                    // part of the protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(client = %client, error = %e, "WebSocket receive error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.hub.disconnect(client);
    info!(
        connections = state.limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Parse one inbound frame and dispatch it to the hub.
///
/// Malformed or rejected frames are logged and skipped; they never tear
/// down the connection.
fn dispatch_client_frame(state: &AppState, client: ClientId, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(client = %client, error = %e, "Malformed client frame");
            return;
        }
    };

    match event {
        ClientEvent::ControlData(frame) => {
            if let Err(e) = state.hub.handle_control(client, frame) {
                warn!(client = %client, error = %e, "Rejected control frame");
            }
        }
        ClientEvent::Esp32Connect(payload) => {
            if let Some(payload) = payload {
                debug!(client = %client, payload = %payload, "Device handshake payload");
            }
            state.hub.handle_device_handshake(client);
        }
        ClientEvent::Ping => state.hub.handle_ping(client),
    }
}
