//! Seam to the map widget.
//!
//! The engine never renders. Everything it needs from the underlying map
//! library goes through [`MapSurface`] (the live map instance) and
//! [`MapContainer`] (the element the instance is created in). Hosts
//! implement these against a real widget; [`crate::headless::HeadlessMap`]
//! implements them in memory.

use frames::{Bounds, LatLng};

use crate::registry::MarkerKey;
use crate::relay::{MapEventKind, MarkerEventKind};
use crate::view::View;

/// Whether a view change is applied instantly or animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Immediate,
    Animated,
}

/// Where a marker label is drawn relative to the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelDirection {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

/// Everything needed to construct one marker overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec<'a> {
    /// Element key the host reports marker events under.
    pub key: &'a MarkerKey,
    /// Label text.
    pub name: &'a str,
    pub position: LatLng,
    /// Permanent labels are always shown; others only on hover/focus.
    pub label_permanent: bool,
    pub label_direction: LabelDirection,
    pub draggable: bool,
    /// Native events the host must report for this overlay.
    pub events: &'a [MarkerEventKind],
}

/// A live map instance.
pub trait MapSurface {
    /// Handle to a marker overlay attached to this map.
    type Overlay: Clone + std::fmt::Debug;

    /// Construct an overlay, attach it to the map and return its handle.
    fn add_overlay(&mut self, spec: &OverlaySpec<'_>) -> Self::Overlay;

    /// Detach an overlay. Its event subscriptions die with it.
    fn remove_overlay(&mut self, overlay: &Self::Overlay);

    /// Relocate an overlay.
    fn move_overlay(&mut self, overlay: &Self::Overlay, to: LatLng);

    /// Current overlay position, which may differ from the last requested one
    /// after a user drag. `None` if the overlay is no longer attached.
    fn overlay_position(&self, overlay: &Self::Overlay) -> Option<LatLng>;

    fn open_label(&mut self, overlay: &Self::Overlay);

    /// Current center and zoom.
    fn view(&self) -> View;

    fn set_view(&mut self, view: View, motion: Motion);

    fn fit_bounds(&mut self, bounds: Bounds, motion: Motion);

    fn set_zoom(&mut self, zoom: f64);

    /// Advance time-dependent layers (day/night terminator) to `now_ms`.
    fn refresh_terminator(&mut self, now_ms: f64);
}

/// The element a map instance is created in. Consumed on creation.
pub trait MapContainer {
    type Map: MapSurface;

    /// Create the map at `home`, reporting `events` back to the engine.
    fn create_map(self, home: View, events: &[MapEventKind]) -> Self::Map;
}
