//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the current marker set and two broadcast channels:
//! - `push_tx` carries server → client pushes (marker ops, view commands) to
//!   every connected map session.
//! - `event_tx` carries pre-serialized event notifications to SSE
//!   subscribers.
//!
//! Broadcast channels are bounded. A subscriber that falls behind loses the
//! oldest messages and is told how many it skipped; the sender never blocks.

use std::sync::Arc;

use frames::{LatLng, MarkerId, Push};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use crate::config::ServerConfig;

// =============================================================================
// MARKER
// =============================================================================

/// Server-side marker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    #[serde(rename = "latLng")]
    pub lat_lng: LatLng,
}

/// Current markers in insertion order.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the marker with the same id. Replacement keeps the
    /// original position in the ordering.
    pub fn upsert(&mut self, marker: Marker) {
        if let Some(existing) = self.markers.iter_mut().find(|m| m.id == marker.id) {
            *existing = marker;
        } else {
            self.markers.push(marker);
        }
    }

    /// Relocate a marker. Returns `false` if the id is unknown.
    pub fn relocate(&mut self, id: &MarkerId, to: LatLng) -> bool {
        match self.markers.iter_mut().find(|m| &m.id == id) {
            Some(marker) => {
                marker.lat_lng = to;
                true
            }
            None => false,
        }
    }

    /// Remove a marker, returning it if it existed.
    pub fn remove(&mut self, id: &MarkerId) -> Option<Marker> {
        let index = self.markers.iter().position(|m| &m.id == id)?;
        Some(self.markers.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; every field is an
/// `Arc` or a cloneable channel handle.
#[derive(Clone)]
pub struct AppState {
    pub markers: Arc<RwLock<MarkerSet>>,
    pub push_tx: broadcast::Sender<Push>,
    /// JSON text of each `notifications/map.event` notification.
    pub event_tx: broadcast::Sender<Arc<str>>,
    pub sse_keepalive_secs: u64,
}

impl AppState {
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        let (push_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (event_tx, _) = broadcast::channel(config.broadcast_buffer);
        Self {
            markers: Arc::new(RwLock::new(MarkerSet::new())),
            push_tx,
            event_tx,
            sse_keepalive_secs: config.sse_keepalive_secs,
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
