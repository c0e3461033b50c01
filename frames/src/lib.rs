//! Shared wire model for the dynamic map push channel.
//!
//! This crate owns the JSON representation exchanged between `dmap` (the
//! server), `mapsync` (the client-side synchronization engine) and the CLI.
//! Every message is an `{ "event": <name>, "payload": {...} }` envelope:
//! [`Push`] flows server → client, [`ClientEvent`] flows client → server.
//! Coordinates are always `[latitude, longitude]` arrays in decimal degrees.
//!
//! The HTTP side speaks JSON-RPC 2.0: [`RpcRequest`]/[`RpcResponse`] for
//! calls and [`Notification`] for the event stream fanned out to subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod motion;

/// Error returned by the JSON codec helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text could not be encoded or decoded as the expected message.
    #[error("invalid message json: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A geographic coordinate in decimal degrees.
///
/// Serialized as a two-element array `[lat, lng]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.lat, value.lng]
    }
}

/// A rectangular area given by two opposite corners, in any order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub corner1: LatLng,
    pub corner2: LatLng,
}

impl Bounds {
    #[must_use]
    pub fn new(corner1: LatLng, corner2: LatLng) -> Self {
        Self { corner1, corner2 }
    }

    /// South-west corner after normalizing the two corners.
    #[must_use]
    pub fn south_west(&self) -> LatLng {
        LatLng::new(
            self.corner1.lat.min(self.corner2.lat),
            self.corner1.lng.min(self.corner2.lng),
        )
    }

    /// North-east corner after normalizing the two corners.
    #[must_use]
    pub fn north_east(&self) -> LatLng {
        LatLng::new(
            self.corner1.lat.max(self.corner2.lat),
            self.corner1.lng.max(self.corner2.lng),
        )
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.corner1.lat + self.corner2.lat) / 2.0,
            (self.corner1.lng + self.corner2.lng) / 2.0,
        )
    }
}

/// Externally assigned marker identifier, stable for the marker's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MarkerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// SERVER → CLIENT
// =============================================================================

/// View command issued by the server. Every command is idempotent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum MapCommand {
    /// Recenter immediately.
    SetView {
        #[serde(rename = "latLng")]
        lat_lng: LatLng,
        zoom: f64,
    },
    /// Animated recenter.
    FlyTo {
        #[serde(rename = "latLng")]
        lat_lng: LatLng,
        zoom: f64,
    },
    /// Fit the view to a box, immediately.
    FitBounds { corner1: LatLng, corner2: LatLng },
    /// Fit the view to a box, animated.
    FlyToBounds { corner1: LatLng, corner2: LatLng },
    /// Change zoom only.
    SetZoom { zoom: f64 },
    /// Return to the home view.
    ResetView,
    /// Pan to a marker and open its label; ignored when the marker is unknown.
    HighlightMarker { id: MarkerId },
}

impl MapCommand {
    /// Wire name of the command, e.g. `"flyToBounds"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetView { .. } => "setView",
            Self::FlyTo { .. } => "flyTo",
            Self::FitBounds { .. } => "fitBounds",
            Self::FlyToBounds { .. } => "flyToBounds",
            Self::SetZoom { .. } => "setZoom",
            Self::ResetView => "resetView",
            Self::HighlightMarker { .. } => "highlightMarker",
        }
    }
}

/// Payload of `dmarker-add`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerAdd {
    pub id: MarkerId,
    pub name: String,
    #[serde(rename = "latLng")]
    pub lat_lng: LatLng,
}

/// Payload of `dmarker-update`.
///
/// The marker source also sends the display name; it is informational only
/// since names never change after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub id: MarkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "latLng")]
    pub lat_lng: LatLng,
}

/// Payload of `dmarker-delete`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDelete {
    pub id: MarkerId,
}

/// A single server → client push.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum Push {
    #[serde(rename = "dmarker-add")]
    MarkerAdd(MarkerAdd),
    #[serde(rename = "dmarker-update")]
    MarkerUpdate(MarkerUpdate),
    #[serde(rename = "dmarker-delete")]
    MarkerDelete(MarkerDelete),
    #[serde(rename = "map-command")]
    Command(MapCommand),
}

impl Push {
    /// Wire event name of this push.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::MarkerAdd(_) => "dmarker-add",
            Self::MarkerUpdate(_) => "dmarker-update",
            Self::MarkerDelete(_) => "dmarker-delete",
            Self::Command(_) => "map-command",
        }
    }
}

// =============================================================================
// CLIENT → SERVER
// =============================================================================

/// Payload of `map-event`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapEventPayload {
    /// Native event name, e.g. `"moveend"`.
    pub event: String,
    /// Pointer coordinate; `null` for events without one (zoom, resize, ...).
    #[serde(rename = "latLng", default)]
    pub lat_lng: Option<LatLng>,
    /// Map center at fire time.
    pub center: LatLng,
    /// Map zoom at fire time.
    pub zoom: f64,
}

/// Payload of `marker-event`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerEventPayload {
    /// Native event name, e.g. `"dragend"`.
    pub event: String,
    pub id: MarkerId,
    pub name: String,
    /// Marker position at fire time.
    #[serde(rename = "latLng")]
    pub lat_lng: LatLng,
}

/// A single client → server interaction event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientEvent {
    #[serde(rename = "map-event")]
    Map(MapEventPayload),
    #[serde(rename = "marker-event")]
    Marker(MarkerEventPayload),
}

impl ClientEvent {
    /// Native event name carried in the payload.
    #[must_use]
    pub fn native_name(&self) -> &str {
        match self {
            Self::Map(payload) => &payload.event,
            Self::Marker(payload) => &payload.event,
        }
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// JSON-RPC method name of every event notification.
pub const MAP_EVENT_METHOD: &str = "notifications/map.event";

/// Marker operation reported by the marker source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerOpKind {
    Add,
    Update,
    Delete,
}

/// A marker operation as published to event subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerOpPayload {
    pub op: MarkerOpKind,
    pub id: MarkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "latLng", default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<LatLng>,
}

/// Anything published to event subscribers, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BroadcastEvent {
    #[serde(rename = "marker-op")]
    MarkerOp(MarkerOpPayload),
    #[serde(rename = "marker-event")]
    MarkerEvent(MarkerEventPayload),
    #[serde(rename = "map-event")]
    MapEvent(MapEventPayload),
}

impl From<ClientEvent> for BroadcastEvent {
    fn from(event: ClientEvent) -> Self {
        match event {
            ClientEvent::Map(payload) => Self::MapEvent(payload),
            ClientEvent::Marker(payload) => Self::MarkerEvent(payload),
        }
    }
}

/// JSON-RPC 2.0 notification wrapping a [`BroadcastEvent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    pub params: BroadcastEvent,
}

impl Notification {
    #[must_use]
    pub fn map_event(params: BroadcastEvent) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_owned(), method: MAP_EVENT_METHOD.to_owned(), params }
    }
}

// =============================================================================
// JSON-RPC
// =============================================================================

pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request. `id` is echoed verbatim in the response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    #[must_use]
    pub fn new(id: u64, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_owned(), id: id.into(), method: method.into(), params }
    }
}

/// Error member of a failed JSON-RPC response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// A JSON-RPC 2.0 response: exactly one of `result` / `error` is present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    #[must_use]
    pub fn ok(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_owned(), id, result: Some(result), error: None }
    }

    #[must_use]
    pub fn err(id: serde_json::Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(RpcErrorObject { code, message: message.into() }),
        }
    }
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_owned()
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode a push as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_push(push: &Push) -> Result<String, CodecError> {
    Ok(serde_json::to_string(push)?)
}

/// Decode a push from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text or unknown event names.
pub fn decode_push(text: &str) -> Result<Push, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a client event as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_event(event: &ClientEvent) -> Result<String, CodecError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a client event from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text or unknown event names.
pub fn decode_event(text: &str) -> Result<ClientEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode an event notification as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_notification(notification: &Notification) -> Result<String, CodecError> {
    Ok(serde_json::to_string(notification)?)
}

/// Decode an event notification from JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text or unknown event types.
pub fn decode_notification(text: &str) -> Result<Notification, CodecError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
