//! In-memory map surface.
//!
//! `HeadlessMap` keeps just enough state to answer every [`MapSurface`]
//! query: overlay positions and labels, the current view, and a count of
//! view changes and terminator refreshes. The CLI uses it to run a session
//! without a browser; tests use it to observe what the engine asked for.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use std::collections::BTreeMap;

use frames::{Bounds, LatLng};

use crate::registry::MarkerKey;
use crate::relay::{MapEventKind, MarkerEventKind};
use crate::surface::{LabelDirection, MapContainer, MapSurface, Motion, OverlaySpec};
use crate::view::{View, clamp_zoom};

/// Handle to an overlay on a [`HeadlessMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(u64);

/// Recorded state of one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessOverlay {
    pub key: MarkerKey,
    pub name: String,
    pub position: LatLng,
    pub label_permanent: bool,
    pub label_direction: LabelDirection,
    pub label_open: bool,
    pub draggable: bool,
    pub events: Vec<MarkerEventKind>,
}

/// A map instance with no rendering.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    view: View,
    overlays: BTreeMap<OverlayId, HeadlessOverlay>,
    next_id: u64,
    events: Vec<MapEventKind>,
    last_motion: Option<Motion>,
    view_changes: usize,
    terminator_refreshes: Vec<f64>,
    overlays_created: usize,
}

impl HeadlessMap {
    #[must_use]
    pub fn new(home: View, events: &[MapEventKind]) -> Self {
        Self {
            view: home,
            overlays: BTreeMap::new(),
            next_id: 1,
            events: events.to_vec(),
            last_motion: None,
            view_changes: 0,
            terminator_refreshes: Vec::new(),
            overlays_created: 0,
        }
    }

    /// Attached overlay by handle.
    #[must_use]
    pub fn overlay(&self, id: OverlayId) -> Option<&HeadlessOverlay> {
        self.overlays.get(&id)
    }

    /// Attached overlay by element key.
    #[must_use]
    pub fn overlay_by_key(&self, key: &MarkerKey) -> Option<(OverlayId, &HeadlessOverlay)> {
        self.overlays
            .iter()
            .find(|(_, overlay)| &overlay.key == key)
            .map(|(id, overlay)| (*id, overlay))
    }

    /// Attached overlays in creation order.
    pub fn overlays(&self) -> impl Iterator<Item = (OverlayId, &HeadlessOverlay)> {
        self.overlays.iter().map(|(id, overlay)| (*id, overlay))
    }

    /// Number of attached overlays.
    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Number of overlays ever constructed, including removed ones.
    #[must_use]
    pub fn overlays_created(&self) -> usize {
        self.overlays_created
    }

    /// Simulate a user drag: the widget moves the overlay on its own.
    pub fn drag_overlay(&mut self, id: OverlayId, to: LatLng) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.position = to;
        }
    }

    /// Simulate a user pan/zoom that the engine did not request.
    pub fn pan_to(&mut self, view: View) {
        self.view = view;
    }

    /// Map events the engine asked to be reported.
    #[must_use]
    pub fn subscribed_events(&self) -> &[MapEventKind] {
        &self.events
    }

    /// Number of engine-requested view changes.
    #[must_use]
    pub fn view_changes(&self) -> usize {
        self.view_changes
    }

    /// Motion of the most recent engine-requested view change.
    #[must_use]
    pub fn last_motion(&self) -> Option<Motion> {
        self.last_motion
    }

    /// Host timestamps at which the terminator was refreshed.
    #[must_use]
    pub fn terminator_refreshes(&self) -> &[f64] {
        &self.terminator_refreshes
    }

    fn record_view(&mut self, view: View, motion: Motion) {
        self.view = view;
        self.last_motion = Some(motion);
        self.view_changes += 1;
    }
}

impl MapSurface for HeadlessMap {
    type Overlay = OverlayId;

    fn add_overlay(&mut self, spec: &OverlaySpec<'_>) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays_created += 1;
        self.overlays.insert(
            id,
            HeadlessOverlay {
                key: spec.key.clone(),
                name: spec.name.to_owned(),
                position: spec.position,
                label_permanent: spec.label_permanent,
                label_direction: spec.label_direction,
                label_open: spec.label_permanent,
                draggable: spec.draggable,
                events: spec.events.to_vec(),
            },
        );
        id
    }

    fn remove_overlay(&mut self, overlay: &OverlayId) {
        self.overlays.remove(overlay);
    }

    fn move_overlay(&mut self, overlay: &OverlayId, to: LatLng) {
        if let Some(o) = self.overlays.get_mut(overlay) {
            o.position = to;
        }
    }

    fn overlay_position(&self, overlay: &OverlayId) -> Option<LatLng> {
        self.overlays.get(overlay).map(|o| o.position)
    }

    fn open_label(&mut self, overlay: &OverlayId) {
        if let Some(o) = self.overlays.get_mut(overlay) {
            o.label_open = true;
        }
    }

    fn view(&self) -> View {
        self.view
    }

    fn set_view(&mut self, view: View, motion: Motion) {
        self.record_view(view.with_zoom(view.zoom), motion);
    }

    fn fit_bounds(&mut self, bounds: Bounds, motion: Motion) {
        self.record_view(View::fitting(bounds), motion);
    }

    fn set_zoom(&mut self, zoom: f64) {
        let view = self.view.with_zoom(clamp_zoom(zoom));
        self.record_view(view, Motion::Immediate);
    }

    fn refresh_terminator(&mut self, now_ms: f64) {
        self.terminator_refreshes.push(now_ms);
    }
}

/// Container that creates a [`HeadlessMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessContainer;

impl MapContainer for HeadlessContainer {
    type Map = HeadlessMap;

    fn create_map(self, home: View, events: &[MapEventKind]) -> HeadlessMap {
        HeadlessMap::new(home, events)
    }
}
