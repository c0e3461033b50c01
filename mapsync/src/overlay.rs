//! Overlay factory: builds, attaches and registers one marker overlay.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use tracing::trace;

use crate::activity::LogEntry;
use crate::lifecycle::MarkerElement;
use crate::registry::MarkerRegistry;
use crate::relay::MARKER_EVENTS;
use crate::surface::{LabelDirection, MapSurface, OverlaySpec};

/// Result of [`create`].
#[derive(Debug, Clone, PartialEq)]
pub struct Created<H> {
    /// The registered handle, new or pre-existing.
    pub handle: H,
    /// `Some` only when a new overlay was attached.
    pub log: Option<LogEntry>,
}

/// Attach an overlay for `element` and register it.
///
/// The overlay gets a hover label above the marker, is draggable, and has
/// every event in [`MARKER_EVENTS`] wired. If the element's key is already
/// registered nothing is built and the existing handle is returned.
pub fn create<M>(
    map: &mut M,
    registry: &mut MarkerRegistry<M::Overlay>,
    element: &MarkerElement,
    now_ms: f64,
) -> Created<M::Overlay>
where
    M: MapSurface,
{
    let key = element.key();
    if let Some(existing) = registry.lookup(&key) {
        trace!(%key, "overlay already registered");
        return Created { handle: existing.clone(), log: None };
    }

    let handle = map.add_overlay(&OverlaySpec {
        key: &key,
        name: &element.name,
        position: element.lat_lng,
        label_permanent: false,
        label_direction: LabelDirection::Top,
        draggable: true,
        events: MARKER_EVENTS,
    });
    registry.register(key, handle.clone(), element.id.clone(), element.name.clone());

    Created { handle, log: Some(LogEntry::appeared(&element.name, now_ms)) }
}
