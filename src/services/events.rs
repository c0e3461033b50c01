//! Event broadcaster: fan-out of interaction events and marker ops to SSE
//! subscribers.
//!
//! Each event is wrapped in a `notifications/map.event` JSON-RPC
//! notification and serialized once; subscribers receive the shared text.

use std::sync::Arc;

use frames::{BroadcastEvent, Notification};
use tracing::{trace, warn};

use crate::state::AppState;

/// Publish one event. Returns the number of subscribers it reached.
pub fn publish(state: &AppState, event: BroadcastEvent) -> usize {
    let notification = Notification::map_event(event);
    let text = match frames::encode_notification(&notification) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "event notification not serializable; dropped");
            return 0;
        }
    };
    match state.event_tx.send(Arc::from(text)) {
        Ok(reached) => reached,
        Err(_) => {
            trace!("no event subscribers");
            0
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
