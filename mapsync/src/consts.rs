//! Shared numeric constants for the mapsync crate.

// ── Home view ───────────────────────────────────────────────────

/// Latitude of the default view (continental US).
pub const HOME_LAT: f64 = 39.5;

/// Longitude of the default view (continental US).
pub const HOME_LNG: f64 = -98.35;

/// Zoom level of the default view.
pub const HOME_ZOOM: f64 = 4.0;

// ── Event relay ─────────────────────────────────────────────────

/// Leading-edge throttle window for pointer motion, in milliseconds.
pub const POINTER_THROTTLE_MS: f64 = 1_000.0;

// ── Background tasks ────────────────────────────────────────────

/// Interval between day/night terminator refreshes, in milliseconds.
pub const TERMINATOR_REFRESH_MS: f64 = 60_000.0;

// ── Activity log ────────────────────────────────────────────────

/// Maximum number of entries retained by [`crate::activity::ActivityLog`].
pub const ACTIVITY_LOG_CAP: usize = 60;

// ── Registry ────────────────────────────────────────────────────

/// Namespace prepended to marker ids to form element keys.
pub const MARKER_KEY_PREFIX: &str = "markers-";

// ── Zoom limits ─────────────────────────────────────────────────

/// Lowest zoom level the map accepts.
pub const MIN_ZOOM: f64 = 0.0;

/// Highest zoom level the tile source serves.
pub const MAX_ZOOM: f64 = 18.0;
