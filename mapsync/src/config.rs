//! Engine tunables.

use crate::consts::{POINTER_THROTTLE_MS, TERMINATOR_REFRESH_MS};
use crate::view::View;

/// Per-session configuration for a [`crate::controller::MapController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// View the map starts at and returns to on `resetView`.
    pub home: View,
    /// Leading-edge throttle window for pointer motion, in milliseconds.
    pub pointer_throttle_ms: f64,
    /// Interval between terminator refreshes, in milliseconds.
    pub terminator_interval_ms: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home: View::home(),
            pointer_throttle_ms: POINTER_THROTTLE_MS,
            terminator_interval_ms: TERMINATOR_REFRESH_MS,
        }
    }
}
