//! Event relay: native interaction events in, schema-stable outbound events out.
//!
//! The map widget fires events at arbitrary rates, some of them once per
//! animation frame. This module decides which native event types are
//! forwarded at all (`Forwarding`), shapes each forwarded event into a
//! [`ClientEvent`] with a fixed payload schema, and applies leading-edge
//! throttling to the single high-frequency event that is forwarded (pointer
//! motion over the map).

#[cfg(test)]
#[path = "relay_test.rs"]
mod relay_test;

use std::fmt;
use std::str::FromStr;

use frames::{ClientEvent, LatLng, MapEventPayload, MarkerEventPayload, MarkerId};

use crate::view::View;

/// Error returned when parsing native event names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The name is not part of the map widget's event vocabulary.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),
}

/// How the relay treats a native event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarding {
    /// Forwarded on every fire.
    Always,
    /// Forwarded at most once per throttle window.
    Throttled,
    /// Never forwarded; continuous per-frame events.
    Never,
}

// =============================================================================
// MAP EVENTS
// =============================================================================

/// Native events fired by the map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Click,
    DblClick,
    ContextMenu,
    MouseOver,
    MouseOut,
    /// Pointer motion over the map. Throttled.
    MouseMove,
    MoveEnd,
    ZoomEnd,
    ZoomLevelsChange,
    Resize,
    LocationFound,
    LocationError,
    PopupOpen,
    PopupClose,
    TooltipOpen,
    TooltipClose,
    LayerAdd,
    LayerRemove,
    /// Pan in progress. Never forwarded.
    Move,
    /// Pan start. Never forwarded.
    MoveStart,
    /// Zoom in progress. Never forwarded.
    Zoom,
    /// Zoom start. Never forwarded.
    ZoomStart,
}

/// Map events forwarded on every fire.
pub const MAP_EVENTS: &[MapEventKind] = &[
    MapEventKind::Click,
    MapEventKind::DblClick,
    MapEventKind::ContextMenu,
    MapEventKind::MouseOver,
    MapEventKind::MouseOut,
    MapEventKind::MoveEnd,
    MapEventKind::ZoomEnd,
    MapEventKind::ZoomLevelsChange,
    MapEventKind::Resize,
    MapEventKind::LocationFound,
    MapEventKind::LocationError,
    MapEventKind::PopupOpen,
    MapEventKind::PopupClose,
    MapEventKind::TooltipOpen,
    MapEventKind::TooltipClose,
    MapEventKind::LayerAdd,
    MapEventKind::LayerRemove,
];

const ALL_MAP_EVENTS: &[MapEventKind] = &[
    MapEventKind::Click,
    MapEventKind::DblClick,
    MapEventKind::ContextMenu,
    MapEventKind::MouseOver,
    MapEventKind::MouseOut,
    MapEventKind::MouseMove,
    MapEventKind::MoveEnd,
    MapEventKind::ZoomEnd,
    MapEventKind::ZoomLevelsChange,
    MapEventKind::Resize,
    MapEventKind::LocationFound,
    MapEventKind::LocationError,
    MapEventKind::PopupOpen,
    MapEventKind::PopupClose,
    MapEventKind::TooltipOpen,
    MapEventKind::TooltipClose,
    MapEventKind::LayerAdd,
    MapEventKind::LayerRemove,
    MapEventKind::Move,
    MapEventKind::MoveStart,
    MapEventKind::Zoom,
    MapEventKind::ZoomStart,
];

impl MapEventKind {
    /// Native event name as fired by the widget.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::ContextMenu => "contextmenu",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseMove => "mousemove",
            Self::MoveEnd => "moveend",
            Self::ZoomEnd => "zoomend",
            Self::ZoomLevelsChange => "zoomlevelschange",
            Self::Resize => "resize",
            Self::LocationFound => "locationfound",
            Self::LocationError => "locationerror",
            Self::PopupOpen => "popupopen",
            Self::PopupClose => "popupclose",
            Self::TooltipOpen => "tooltipopen",
            Self::TooltipClose => "tooltipclose",
            Self::LayerAdd => "layeradd",
            Self::LayerRemove => "layerremove",
            Self::Move => "move",
            Self::MoveStart => "movestart",
            Self::Zoom => "zoom",
            Self::ZoomStart => "zoomstart",
        }
    }

    #[must_use]
    pub fn forwarding(self) -> Forwarding {
        match self {
            Self::MouseMove => Forwarding::Throttled,
            Self::Move | Self::MoveStart | Self::Zoom | Self::ZoomStart => Forwarding::Never,
            _ => Forwarding::Always,
        }
    }
}

impl fmt::Display for MapEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapEventKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MAP_EVENTS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RelayError::UnknownEvent(s.to_owned()))
    }
}

// =============================================================================
// MARKER EVENTS
// =============================================================================

/// Native events fired by a marker overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerEventKind {
    Click,
    DblClick,
    ContextMenu,
    MouseOver,
    MouseOut,
    MouseDown,
    MouseUp,
    DragStart,
    /// Drag in progress. Never forwarded.
    Drag,
    DragEnd,
    /// Overlay moving. Never forwarded.
    Move,
    TooltipOpen,
    TooltipClose,
}

/// Marker events wired on every overlay.
pub const MARKER_EVENTS: &[MarkerEventKind] = &[
    MarkerEventKind::Click,
    MarkerEventKind::DblClick,
    MarkerEventKind::ContextMenu,
    MarkerEventKind::MouseOver,
    MarkerEventKind::MouseOut,
    MarkerEventKind::MouseDown,
    MarkerEventKind::MouseUp,
    MarkerEventKind::DragStart,
    MarkerEventKind::DragEnd,
    MarkerEventKind::TooltipOpen,
    MarkerEventKind::TooltipClose,
];

const ALL_MARKER_EVENTS: &[MarkerEventKind] = &[
    MarkerEventKind::Click,
    MarkerEventKind::DblClick,
    MarkerEventKind::ContextMenu,
    MarkerEventKind::MouseOver,
    MarkerEventKind::MouseOut,
    MarkerEventKind::MouseDown,
    MarkerEventKind::MouseUp,
    MarkerEventKind::DragStart,
    MarkerEventKind::Drag,
    MarkerEventKind::DragEnd,
    MarkerEventKind::Move,
    MarkerEventKind::TooltipOpen,
    MarkerEventKind::TooltipClose,
];

impl MarkerEventKind {
    /// Native event name as fired by the widget.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::ContextMenu => "contextmenu",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::DragStart => "dragstart",
            Self::Drag => "drag",
            Self::DragEnd => "dragend",
            Self::Move => "move",
            Self::TooltipOpen => "tooltipopen",
            Self::TooltipClose => "tooltipclose",
        }
    }

    #[must_use]
    pub fn forwarding(self) -> Forwarding {
        match self {
            Self::Drag | Self::Move => Forwarding::Never,
            _ => Forwarding::Always,
        }
    }
}

impl fmt::Display for MarkerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerEventKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MARKER_EVENTS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RelayError::UnknownEvent(s.to_owned()))
    }
}

// =============================================================================
// THROTTLE
// =============================================================================

/// Leading-edge throttle: the first fire after the window elapses passes,
/// everything inside the window is dropped (not queued, not coalesced).
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    window_ms: f64,
    last_fired_ms: Option<f64>,
}

impl Throttle {
    #[must_use]
    pub fn new(window_ms: f64) -> Self {
        Self { window_ms, last_fired_ms: None }
    }

    /// Returns `true` and records `now_ms` if a fire at `now_ms` may pass.
    pub fn admit(&mut self, now_ms: f64) -> bool {
        let open = self
            .last_fired_ms
            .map_or(true, |last| now_ms - last >= self.window_ms);
        if open {
            self.last_fired_ms = Some(now_ms);
        }
        open
    }
}

// =============================================================================
// RELAY
// =============================================================================

/// Applies the forwarding policy and payload schema to native events.
#[derive(Debug, Clone)]
pub struct EventRelay {
    pointer: Throttle,
}

impl EventRelay {
    #[must_use]
    pub fn new(pointer_throttle_ms: f64) -> Self {
        Self { pointer: Throttle::new(pointer_throttle_ms) }
    }

    /// Shape a map event, or `None` if policy suppresses it.
    ///
    /// `view` must be the map's view at fire time.
    pub fn map_event(
        &mut self,
        kind: MapEventKind,
        lat_lng: Option<LatLng>,
        view: View,
        now_ms: f64,
    ) -> Option<ClientEvent> {
        match kind.forwarding() {
            Forwarding::Never => return None,
            Forwarding::Throttled => {
                if !self.pointer.admit(now_ms) {
                    return None;
                }
            }
            Forwarding::Always => {}
        }
        Some(ClientEvent::Map(MapEventPayload {
            event: kind.as_str().to_owned(),
            lat_lng,
            center: view.center,
            zoom: view.zoom,
        }))
    }

    /// Shape a marker event, or `None` if policy suppresses it.
    ///
    /// `position` must be the overlay's position at fire time.
    #[must_use]
    pub fn marker_event(
        &self,
        kind: MarkerEventKind,
        id: &MarkerId,
        name: &str,
        position: LatLng,
    ) -> Option<ClientEvent> {
        if kind.forwarding() == Forwarding::Never {
            return None;
        }
        Some(ClientEvent::Marker(MarkerEventPayload {
            event: kind.as_str().to_owned(),
            id: id.clone(),
            name: name.to_owned(),
            lat_lng: position,
        }))
    }
}
