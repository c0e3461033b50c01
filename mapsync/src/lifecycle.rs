//! Marker lifecycle adapter.
//!
//! Each marker-representing element reports three lifecycle notifications:
//! it was created, its coordinates changed, or it went away. They arrive as
//! one [`LifecycleEvent`] enum and are routed to the pending queue, the
//! overlay factory or the registry depending on whether the map is ready.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use frames::{LatLng, MarkerAdd, MarkerDelete, MarkerId, MarkerUpdate};
use tracing::{debug, trace};

use crate::activity::LogEntry;
use crate::controller::{Action, MapController, Phase};
use crate::overlay;
use crate::registry::MarkerKey;
use crate::surface::MapSurface;

/// Snapshot of a marker-representing element.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerElement {
    pub id: MarkerId,
    pub name: String,
    pub lat_lng: LatLng,
}

impl MarkerElement {
    #[must_use]
    pub fn new(id: MarkerId, name: String, lat_lng: LatLng) -> Self {
        Self { id, name, lat_lng }
    }

    /// Namespaced key this element is registered under.
    #[must_use]
    pub fn key(&self) -> MarkerKey {
        MarkerKey::for_marker(&self.id)
    }
}

impl From<MarkerAdd> for MarkerElement {
    fn from(add: MarkerAdd) -> Self {
        Self { id: add.id, name: add.name, lat_lng: add.lat_lng }
    }
}

/// One lifecycle notification for a marker element.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Created(MarkerElement),
    Updated { id: MarkerId, lat_lng: LatLng },
    Destroyed { id: MarkerId },
}

impl From<MarkerUpdate> for LifecycleEvent {
    fn from(update: MarkerUpdate) -> Self {
        Self::Updated { id: update.id, lat_lng: update.lat_lng }
    }
}

impl From<MarkerDelete> for LifecycleEvent {
    fn from(delete: MarkerDelete) -> Self {
        Self::Destroyed { id: delete.id }
    }
}

impl<M: MapSurface> MapController<M> {
    /// Route a lifecycle notification.
    ///
    /// Before readiness, creations are queued and updates/destroys edit the
    /// queued entry. Afterwards they go straight to the overlay factory and
    /// registry. Misses are silent.
    pub fn on_lifecycle(&mut self, event: LifecycleEvent, now_ms: f64) -> Vec<Action> {
        match &mut self.phase {
            Phase::Uninitialized { pending } => {
                match event {
                    LifecycleEvent::Created(element) => {
                        trace!(key = %element.key(), "queued until map is ready");
                        pending.enqueue(element, now_ms);
                    }
                    LifecycleEvent::Updated { id, lat_lng } => {
                        if !pending.relocate(&MarkerKey::for_marker(&id), lat_lng) {
                            debug!(%id, "update for unknown marker");
                        }
                    }
                    LifecycleEvent::Destroyed { id } => {
                        if !pending.discard(&MarkerKey::for_marker(&id)) {
                            debug!(%id, "destroy for unknown marker");
                        }
                    }
                }
                Vec::new()
            }
            Phase::Ready(ready) => match event {
                LifecycleEvent::Created(element) => {
                    let created = overlay::create(&mut ready.map, &mut ready.registry, &element, now_ms);
                    created.log.map(Action::Log).into_iter().collect()
                }
                LifecycleEvent::Updated { id, lat_lng } => {
                    let key = MarkerKey::for_marker(&id);
                    match ready.registry.move_to(&key, lat_lng, &mut ready.map) {
                        Some(name) => vec![Action::Log(LogEntry::moved(name, now_ms))],
                        None => {
                            debug!(%id, "update for unknown marker");
                            Vec::new()
                        }
                    }
                }
                LifecycleEvent::Destroyed { id } => {
                    let key = MarkerKey::for_marker(&id);
                    match ready.registry.unregister(&key) {
                        Some(entry) => {
                            ready.map.remove_overlay(&entry.handle);
                            vec![Action::Log(LogEntry::removed(&entry.name, now_ms))]
                        }
                        None => {
                            debug!(%id, "destroy for unknown marker");
                            Vec::new()
                        }
                    }
                }
            },
        }
    }
}
