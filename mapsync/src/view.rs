#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use frames::{Bounds, LatLng};

use crate::consts::{HOME_LAT, HOME_LNG, HOME_ZOOM, MAX_ZOOM, MIN_ZOOM};

/// Visible portion of the map: a center and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}

impl Default for View {
    fn default() -> Self {
        Self::home()
    }
}

impl View {
    #[must_use]
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// The fixed default view shown before any command is applied.
    #[must_use]
    pub fn home() -> Self {
        Self { center: LatLng::new(HOME_LAT, HOME_LNG), zoom: HOME_ZOOM }
    }

    /// Same center, different zoom, clamped to the supported range.
    #[must_use]
    pub fn with_zoom(self, zoom: f64) -> Self {
        Self { center: self.center, zoom: clamp_zoom(zoom) }
    }

    /// Same zoom, different center.
    #[must_use]
    pub fn centered_on(self, center: LatLng) -> Self {
        Self { center, zoom: self.zoom }
    }

    /// The largest integer zoom at which `bounds` still fits a 256px tile
    /// world, centered on the box midpoint.
    #[must_use]
    pub fn fitting(bounds: Bounds) -> Self {
        let sw = bounds.south_west();
        let ne = bounds.north_east();
        let lng_span = (ne.lng - sw.lng).abs();
        let lat_span = (ne.lat - sw.lat).abs() * 2.0;
        let span = lng_span.max(lat_span);
        let zoom = if span <= f64::EPSILON {
            MAX_ZOOM
        } else {
            (360.0 / span).log2().floor()
        };
        Self { center: bounds.center(), zoom: clamp_zoom(zoom) }
    }
}

/// Clamp a zoom level into `[MIN_ZOOM, MAX_ZOOM]`.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
