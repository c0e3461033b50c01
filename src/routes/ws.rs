//! WebSocket handler: one map session's push channel.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming text frames → decode as `ClientEvent` → event broadcaster
//! - Pushes from the marker source and command queue → forward to client
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → subscribe to pushes, then replay the current marker set as
//!    `dmarker-add` pushes
//! 2. Marker ops and view commands are relayed as they happen
//! 3. Close (either side) or a closed push channel ends the session
//!
//! Subscribing before the replay means a marker added in between can arrive
//! twice. Adds are idempotent on the client so the duplicate is harmless.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{BroadcastEvent, Push};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::{events, markers};
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut push_rx = state.push_tx.subscribe();

    let snapshot = markers::snapshot_pushes(&state).await;
    info!(%client_id, markers = snapshot.len(), "ws: client connected");
    for push in &snapshot {
        if send_push(&mut socket, push).await.is_err() {
            info!(%client_id, "ws: client left during snapshot");
            return;
        }
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        handle_inbound(&state, client_id, text.as_str());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            push = push_rx.recv() => {
                match push {
                    Ok(push) => {
                        if send_push(&mut socket, &push).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%client_id, skipped, "ws: session lagged; pushes dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAMES
// =============================================================================

/// Decode one inbound text frame and publish it. Returns `false` for
/// malformed frames, which are skipped.
pub fn handle_inbound(state: &AppState, client_id: Uuid, text: &str) -> bool {
    match frames::decode_event(text) {
        Ok(event) => {
            debug!(%client_id, event = event.native_name(), "ws: recv event");
            events::publish(state, BroadcastEvent::from(event));
            true
        }
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            false
        }
    }
}

async fn send_push(socket: &mut WebSocket, push: &Push) -> Result<(), axum::Error> {
    let text = match frames::encode_push(push) {
        Ok(text) => text,
        Err(e) => {
            warn!(event = push.event_name(), error = %e, "ws: push not serializable; skipped");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
