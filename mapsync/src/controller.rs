//! Map controller: the per-session engine.
//!
//! DESIGN
//! ======
//! The controller is host-driven. The host calls in with lifecycle
//! notifications, native interaction events, inbound pushes and clock ticks,
//! each stamped with its own clock (`now_ms`). The controller mutates the map
//! through [`MapSurface`] and returns the [`Action`]s the host must carry out
//! (send an outbound event, append to the activity log).
//!
//! State is a one-way two-phase machine. `Uninitialized` owns the pending
//! queue and nothing else; `Ready` owns the map, the registry, the relay and
//! the terminator task. The queue is consumed by the transition, so nothing
//! can be enqueued after readiness.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use frames::{Bounds, ClientEvent, LatLng, MapCommand, Push};
use tracing::{debug, info, trace, warn};

use crate::activity::LogEntry;
use crate::config::MapConfig;
use crate::lifecycle::{LifecycleEvent, MarkerElement};
use crate::overlay;
use crate::pending::PendingQueue;
use crate::registry::{MarkerKey, MarkerRegistry};
use crate::relay::{EventRelay, MAP_EVENTS, MapEventKind, MarkerEventKind};
use crate::surface::{MapContainer, MapSurface, Motion};
use crate::timer::RepeatingTask;
use crate::view::{View, clamp_zoom};

/// Work returned to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Deliver on the outbound channel.
    Send(ClientEvent),
    /// Append to the activity log.
    Log(LogEntry),
}

/// State owned once the map exists.
#[derive(Debug)]
pub(crate) struct Ready<M: MapSurface> {
    pub(crate) map: M,
    pub(crate) registry: MarkerRegistry<M::Overlay>,
    pub(crate) relay: EventRelay,
    pub(crate) terminator: RepeatingTask,
}

#[derive(Debug)]
pub(crate) enum Phase<M: MapSurface> {
    Uninitialized { pending: PendingQueue },
    Ready(Ready<M>),
}

/// Session-scoped engine owning the map, registry and pending queue.
#[derive(Debug)]
pub struct MapController<M: MapSurface> {
    config: MapConfig,
    pub(crate) phase: Phase<M>,
}

impl<M: MapSurface> Default for MapController<M> {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl<M: MapSurface> MapController<M> {
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self { config, phase: Phase::Uninitialized { pending: PendingQueue::new() } }
    }

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// Create the map in `container`, drain the pending queue into it and
    /// start the terminator task.
    ///
    /// The transition happens once; later calls are ignored.
    pub fn initialize<C>(&mut self, container: C, now_ms: f64) -> Vec<Action>
    where
        C: MapContainer<Map = M>,
    {
        let Phase::Uninitialized { pending } = &mut self.phase else {
            warn!("map already initialized; ignoring");
            return Vec::new();
        };
        let pending = std::mem::take(pending);
        let drained = pending.len();

        let mut subscribed = MAP_EVENTS.to_vec();
        subscribed.push(MapEventKind::MouseMove);
        let mut map = container.create_map(self.config.home, &subscribed);
        let mut registry = MarkerRegistry::new();

        let mut actions = Vec::new();
        pending.drain_into(|entry| {
            let created = overlay::create(&mut map, &mut registry, &entry.element, now_ms);
            actions.extend(created.log.map(Action::Log));
        });

        let mut terminator = RepeatingTask::start(self.config.terminator_interval_ms, now_ms);
        if terminator.poll(now_ms) {
            map.refresh_terminator(now_ms);
        }

        self.phase = Phase::Ready(Ready {
            map,
            registry,
            relay: EventRelay::new(self.config.pointer_throttle_ms),
            terminator,
        });
        info!(drained, "map ready");
        actions
    }

    /// Whether [`MapController::initialize`] has run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    /// Advance time-dependent layers. Returns whether the terminator was
    /// refreshed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Phase::Ready(ready) = &mut self.phase else {
            return false;
        };
        if !ready.terminator.poll(now_ms) {
            return false;
        }
        trace!(now_ms, "terminator refresh");
        ready.map.refresh_terminator(now_ms);
        true
    }

    /// Host time of the next terminator refresh, if one is scheduled.
    #[must_use]
    pub fn next_tick_ms(&self) -> Option<f64> {
        match &self.phase {
            Phase::Ready(ready) => ready.terminator.next_due_ms(),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// End the session: stop the terminator task and hand back the map.
    ///
    /// Returns `None` if the map was never created.
    #[must_use]
    pub fn teardown(self) -> Option<M> {
        match self.phase {
            Phase::Ready(mut ready) => {
                ready.terminator.cancel();
                info!(markers = ready.registry.len(), "map torn down");
                Some(ready.map)
            }
            Phase::Uninitialized { pending } => {
                debug!(discarded = pending.len(), "torn down before map was ready");
                None
            }
        }
    }

    // --- Inbound ---

    /// Apply one server push.
    pub fn apply_push(&mut self, push: Push, now_ms: f64) -> Vec<Action> {
        match push {
            Push::MarkerAdd(add) => {
                self.on_lifecycle(LifecycleEvent::Created(MarkerElement::from(add)), now_ms)
            }
            Push::MarkerUpdate(update) => self.on_lifecycle(update.into(), now_ms),
            Push::MarkerDelete(delete) => self.on_lifecycle(delete.into(), now_ms),
            Push::Command(command) => {
                self.apply_command(&command);
                Vec::new()
            }
        }
    }

    /// Execute a view command against the map. Returns whether the command
    /// was executed.
    ///
    /// Commands received before readiness and highlights of unknown markers
    /// are dropped.
    pub fn apply_command(&mut self, command: &MapCommand) -> bool {
        let Phase::Ready(ready) = &mut self.phase else {
            debug!(command = command.name(), "map not ready; command dropped");
            return false;
        };
        let map = &mut ready.map;
        match command {
            MapCommand::SetView { lat_lng, zoom } => {
                map.set_view(View::new(*lat_lng, clamp_zoom(*zoom)), Motion::Immediate);
            }
            MapCommand::FlyTo { lat_lng, zoom } => {
                map.set_view(View::new(*lat_lng, clamp_zoom(*zoom)), Motion::Animated);
            }
            MapCommand::FitBounds { corner1, corner2 } => {
                map.fit_bounds(Bounds::new(*corner1, *corner2), Motion::Immediate);
            }
            MapCommand::FlyToBounds { corner1, corner2 } => {
                map.fit_bounds(Bounds::new(*corner1, *corner2), Motion::Animated);
            }
            MapCommand::SetZoom { zoom } => map.set_zoom(clamp_zoom(*zoom)),
            MapCommand::ResetView => map.set_view(self.config.home, Motion::Immediate),
            MapCommand::HighlightMarker { id } => {
                let key = MarkerKey::for_marker(id);
                let Some(handle) = ready.registry.lookup(&key) else {
                    debug!(%id, "highlight target not registered");
                    return false;
                };
                let Some(position) = map.overlay_position(handle) else {
                    debug!(%id, "highlight target detached");
                    return false;
                };
                let view = map.view().centered_on(position);
                map.set_view(view, Motion::Animated);
                map.open_label(handle);
            }
        }
        true
    }

    // --- Native events ---

    /// Relay a native map event. `lat_lng` is `None` for events without a
    /// pointer coordinate.
    pub fn on_map_event(
        &mut self,
        kind: MapEventKind,
        lat_lng: Option<LatLng>,
        now_ms: f64,
    ) -> Vec<Action> {
        let Phase::Ready(ready) = &mut self.phase else {
            trace!(%kind, "map event before ready");
            return Vec::new();
        };
        let view = ready.map.view();
        ready.relay.map_event(kind, lat_lng, view, now_ms).map(Action::Send).into_iter().collect()
    }

    /// Relay a native event fired by the overlay registered under `key`.
    ///
    /// The payload carries the overlay's position at fire time, which differs
    /// from the last pushed position after a drag.
    #[must_use]
    pub fn on_marker_event(&self, key: &MarkerKey, kind: MarkerEventKind) -> Vec<Action> {
        let Phase::Ready(ready) = &self.phase else {
            return Vec::new();
        };
        let Some(entry) = ready.registry.get(key) else {
            debug!(%key, %kind, "event from unregistered overlay");
            return Vec::new();
        };
        let Some(position) = ready.map.overlay_position(&entry.handle) else {
            return Vec::new();
        };
        ready
            .relay
            .marker_event(kind, &entry.id, &entry.name, position)
            .map(Action::Send)
            .into_iter()
            .collect()
    }

    // --- Queries ---

    /// Number of creation requests waiting for the map.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        match &self.phase {
            Phase::Uninitialized { pending } => pending.len(),
            Phase::Ready(_) => 0,
        }
    }

    /// The live registry, once the map exists.
    #[must_use]
    pub fn registry(&self) -> Option<&MarkerRegistry<M::Overlay>> {
        match &self.phase {
            Phase::Ready(ready) => Some(&ready.registry),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// The map instance, once created.
    #[must_use]
    pub fn map(&self) -> Option<&M> {
        match &self.phase {
            Phase::Ready(ready) => Some(&ready.map),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// Mutable access to the map, for hosts that forward user gestures.
    pub fn map_mut(&mut self) -> Option<&mut M> {
        match &mut self.phase {
            Phase::Ready(ready) => Some(&mut ready.map),
            Phase::Uninitialized { .. } => None,
        }
    }

    /// Current position of the marker with `key`, as the map reports it.
    #[must_use]
    pub fn marker_position(&self, key: &MarkerKey) -> Option<LatLng> {
        let Phase::Ready(ready) = &self.phase else {
            return None;
        };
        let handle = ready.registry.lookup(key)?;
        ready.map.overlay_position(handle)
    }
}
