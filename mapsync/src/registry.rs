//! Marker registry: element key → live overlay handle.
//!
//! The registry is the engine's record of which markers are currently
//! visible. An entry exists if and only if its overlay is attached to the
//! map. It is pure data; anything that touches the map takes the surface as
//! an argument.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;
use std::fmt;

use frames::{LatLng, MarkerId};

use crate::consts::MARKER_KEY_PREFIX;
use crate::surface::MapSurface;

/// Namespaced element key for a marker, e.g. `markers-a1b2c3d4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerKey(String);

impl MarkerKey {
    /// Key for a server marker id.
    #[must_use]
    pub fn for_marker(id: &MarkerId) -> Self {
        Self(format!("{MARKER_KEY_PREFIX}{id}"))
    }

    /// Wrap an already-namespaced key as reported by the host.
    #[must_use]
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered marker.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredMarker<H> {
    pub handle: H,
    pub id: MarkerId,
    /// Display name; immutable after creation.
    pub name: String,
}

/// Id-keyed set of live overlays.
#[derive(Debug, Clone)]
pub struct MarkerRegistry<H> {
    entries: HashMap<MarkerKey, RegisteredMarker<H>>,
}

impl<H> Default for MarkerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> MarkerRegistry<H> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Store a handle under `key`. Returns `false` and leaves the existing
    /// entry untouched if `key` is already registered.
    pub fn register(&mut self, key: MarkerKey, handle: H, id: MarkerId, name: String) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, RegisteredMarker { handle, id, name });
        true
    }

    /// Handle registered under `key`.
    #[must_use]
    pub fn lookup(&self, key: &MarkerKey) -> Option<&H> {
        self.entries.get(key).map(|entry| &entry.handle)
    }

    /// Full entry registered under `key`.
    #[must_use]
    pub fn get(&self, key: &MarkerKey) -> Option<&RegisteredMarker<H>> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &MarkerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove and return the entry under `key`, if any.
    pub fn unregister(&mut self, key: &MarkerKey) -> Option<RegisteredMarker<H>> {
        self.entries.remove(key)
    }

    /// Number of registered markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&MarkerKey> {
        let mut keys: Vec<&MarkerKey> = self.entries.keys().collect();
        keys.sort();
        keys
    }
}

impl<H: Clone> MarkerRegistry<H> {
    /// Relocate the overlay under `key`. Returns the display name when the
    /// key was registered, `None` (and does nothing) otherwise.
    pub fn move_to<M>(&self, key: &MarkerKey, to: LatLng, map: &mut M) -> Option<&str>
    where
        M: MapSurface<Overlay = H>,
    {
        let entry = self.entries.get(key)?;
        map.move_overlay(&entry.handle, to);
        Some(entry.name.as_str())
    }
}
