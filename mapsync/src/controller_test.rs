#![allow(clippy::float_cmp)]

use frames::{MarkerAdd, MarkerDelete, MarkerEventPayload, MarkerId, MarkerUpdate};

use super::*;
use crate::activity::LogKind;
use crate::headless::{HeadlessContainer, HeadlessMap};

type Controller = MapController<HeadlessMap>;

fn element(id: &str, name: &str, lat: f64, lng: f64) -> MarkerElement {
    MarkerElement::new(MarkerId::from(id), name.to_owned(), LatLng::new(lat, lng))
}

fn created(id: &str, name: &str, lat: f64, lng: f64) -> LifecycleEvent {
    LifecycleEvent::Created(element(id, name, lat, lng))
}

fn updated(id: &str, lat: f64, lng: f64) -> LifecycleEvent {
    LifecycleEvent::Updated { id: MarkerId::from(id), lat_lng: LatLng::new(lat, lng) }
}

fn destroyed(id: &str) -> LifecycleEvent {
    LifecycleEvent::Destroyed { id: MarkerId::from(id) }
}

fn key(id: &str) -> MarkerKey {
    MarkerKey::for_marker(&MarkerId::from(id))
}

fn ready() -> Controller {
    let mut ctl = Controller::default();
    ctl.initialize(HeadlessContainer, 0.0);
    ctl
}

fn map(ctl: &Controller) -> &HeadlessMap {
    ctl.map().expect("map is ready")
}

fn logs(actions: &[Action]) -> Vec<&str> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Log(entry) => Some(entry.message.as_str()),
            Action::Send(_) => None,
        })
        .collect()
}

fn sent(actions: &[Action]) -> Vec<&ClientEvent> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Send(event) => Some(event),
            Action::Log(_) => None,
        })
        .collect()
}

// =============================================================
// Initialization
// =============================================================

#[test]
fn starts_uninitialized() {
    let ctl = Controller::default();
    assert!(!ctl.is_ready());
    assert!(ctl.map().is_none());
    assert!(ctl.registry().is_none());
    assert_eq!(ctl.next_tick_ms(), None);
}

#[test]
fn initialize_creates_map_at_home() {
    let ctl = ready();
    assert!(ctl.is_ready());
    assert_eq!(map(&ctl).view(), View::home());
    assert_eq!(map(&ctl).view_changes(), 0);
}

#[test]
fn initialize_uses_configured_home() {
    let home = View::new(LatLng::new(51.5, -0.12), 9.0);
    let mut ctl = Controller::new(MapConfig { home, ..MapConfig::default() });
    ctl.initialize(HeadlessContainer, 0.0);
    assert_eq!(map(&ctl).view(), home);
}

#[test]
fn initialize_subscribes_pointer_motion_but_not_continuous_events() {
    let ctl = ready();
    let events = map(&ctl).subscribed_events();
    assert!(events.contains(&MapEventKind::Click));
    assert!(events.contains(&MapEventKind::MoveEnd));
    assert!(events.contains(&MapEventKind::MouseMove));
    assert!(!events.contains(&MapEventKind::Move));
    assert!(!events.contains(&MapEventKind::Zoom));
    assert!(!events.contains(&MapEventKind::MoveStart));
    assert!(!events.contains(&MapEventKind::ZoomStart));
}

#[test]
fn second_initialize_is_ignored() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 1.0, 1.0), 1.0);
    let actions = ctl.initialize(HeadlessContainer, 2.0);
    assert!(actions.is_empty());
    assert_eq!(map(&ctl).overlay_count(), 1);
    assert_eq!(ctl.registry().map(MarkerRegistry::len), Some(1));
}

// =============================================================
// Pending queue
// =============================================================

#[test]
fn creations_before_ready_are_queued() {
    let mut ctl = Controller::default();
    assert!(ctl.on_lifecycle(created("c1", "C1", 1.0, 1.0), 0.0).is_empty());
    assert!(ctl.on_lifecycle(created("c2", "C2", 2.0, 2.0), 0.0).is_empty());
    assert_eq!(ctl.pending_len(), 2);
    assert!(ctl.map().is_none());
}

#[test]
fn drain_preserves_arrival_order() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("c1", "C1", 1.0, 1.0), 0.0);
    ctl.on_lifecycle(created("c2", "C2", 2.0, 2.0), 0.0);
    ctl.on_lifecycle(created("c3", "C3", 3.0, 3.0), 0.0);

    let actions = ctl.initialize(HeadlessContainer, 10.0);
    assert_eq!(logs(&actions), vec!["+ C1 appeared", "+ C2 appeared", "+ C3 appeared"]);

    let names: Vec<&str> = map(&ctl).overlays().map(|(_, o)| o.name.as_str()).collect();
    assert_eq!(names, vec!["C1", "C2", "C3"]);
    assert_eq!(ctl.pending_len(), 0);
}

#[test]
fn drained_entries_precede_later_creations() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("early", "Early", 1.0, 1.0), 0.0);
    ctl.initialize(HeadlessContainer, 1.0);
    ctl.on_lifecycle(created("late", "Late", 2.0, 2.0), 2.0);

    let names: Vec<&str> = map(&ctl).overlays().map(|(_, o)| o.name.as_str()).collect();
    assert_eq!(names, vec!["Early", "Late"]);
}

#[test]
fn empty_drain_is_noop() {
    let mut ctl = Controller::default();
    let actions = ctl.initialize(HeadlessContainer, 0.0);
    assert!(logs(&actions).is_empty());
    assert_eq!(map(&ctl).overlay_count(), 0);
}

#[test]
fn duplicate_pending_creation_yields_one_overlay() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("m1", "A", 1.0, 1.0), 0.0);
    ctl.on_lifecycle(created("m1", "A", 1.0, 1.0), 0.0);
    let actions = ctl.initialize(HeadlessContainer, 0.0);
    assert_eq!(logs(&actions).len(), 1);
    assert_eq!(map(&ctl).overlays_created(), 1);
}

#[test]
fn update_before_ready_edits_pending_entry() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);
    assert!(ctl.on_lifecycle(updated("m1", 11.0, 21.0), 1.0).is_empty());

    let actions = ctl.initialize(HeadlessContainer, 2.0);
    assert_eq!(logs(&actions), vec!["+ A appeared"]);
    assert_eq!(ctl.marker_position(&key("m1")), Some(LatLng::new(11.0, 21.0)));
}

#[test]
fn destroy_before_ready_discards_pending_entry() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);
    ctl.on_lifecycle(created("m2", "B", 30.0, 40.0), 0.0);
    assert!(ctl.on_lifecycle(destroyed("m1"), 1.0).is_empty());
    assert_eq!(ctl.pending_len(), 1);

    let actions = ctl.initialize(HeadlessContainer, 2.0);
    assert_eq!(logs(&actions), vec!["+ B appeared"]);
    assert!(ctl.marker_position(&key("m1")).is_none());
}

#[test]
fn unknown_update_before_ready_is_noop() {
    let mut ctl = Controller::default();
    assert!(ctl.on_lifecycle(updated("ghost", 1.0, 1.0), 0.0).is_empty());
    assert!(ctl.on_lifecycle(destroyed("ghost"), 0.0).is_empty());
    assert_eq!(ctl.pending_len(), 0);
}

// =============================================================
// Lifecycle after readiness
// =============================================================

#[test]
fn create_twice_yields_one_entry_and_one_overlay() {
    let mut ctl = ready();
    let first = ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    let second = ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 2.0);
    assert_eq!(logs(&first), vec!["+ A appeared"]);
    assert!(second.is_empty());
    assert_eq!(ctl.registry().map(MarkerRegistry::len), Some(1));
    assert_eq!(map(&ctl).overlays_created(), 1);
}

#[test]
fn update_moves_marker() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    let actions = ctl.on_lifecycle(updated("m1", 11.0, 21.0), 2.0);
    assert_eq!(logs(&actions), vec!["→ A moved"]);
    assert_eq!(ctl.marker_position(&key("m1")), Some(LatLng::new(11.0, 21.0)));
}

#[test]
fn update_unknown_is_noop() {
    let mut ctl = ready();
    assert!(ctl.on_lifecycle(updated("ghost", 1.0, 1.0), 0.0).is_empty());
    assert_eq!(map(&ctl).overlay_count(), 0);
}

#[test]
fn destroy_removes_overlay_and_logs() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    let actions = ctl.on_lifecycle(destroyed("m1"), 2.0);
    assert_eq!(logs(&actions), vec!["✕ A removed"]);
    assert_eq!(map(&ctl).overlay_count(), 0);
    assert_eq!(ctl.registry().map(MarkerRegistry::is_empty), Some(true));
}

#[test]
fn destroy_unknown_is_silent() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    let actions = ctl.on_lifecycle(destroyed("never"), 2.0);
    assert!(actions.is_empty());
    assert_eq!(map(&ctl).overlay_count(), 1);
}

#[test]
fn destroy_twice_logs_once() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    assert_eq!(logs(&ctl.on_lifecycle(destroyed("m1"), 2.0)).len(), 1);
    assert!(ctl.on_lifecycle(destroyed("m1"), 3.0).is_empty());
}

#[test]
fn recreate_after_destroy_builds_new_overlay() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 1.0);
    ctl.on_lifecycle(destroyed("m1"), 2.0);
    let actions = ctl.on_lifecycle(created("m1", "A", 5.0, 5.0), 3.0);
    assert_eq!(logs(&actions), vec!["+ A appeared"]);
    assert_eq!(map(&ctl).overlays_created(), 2);
    assert_eq!(ctl.marker_position(&key("m1")), Some(LatLng::new(5.0, 5.0)));
}

#[test]
fn log_entries_carry_host_time() {
    let mut ctl = ready();
    let actions = ctl.on_lifecycle(created("m1", "A", 0.0, 0.0), 1234.0);
    let Some(Action::Log(entry)) = actions.first() else {
        panic!("expected a log action, got {actions:?}");
    };
    assert_eq!(entry.kind, LogKind::Add);
    assert_eq!(entry.at_ms, 1234.0);
}

// =============================================================
// Pushes
// =============================================================

#[test]
fn apply_push_routes_marker_ops() {
    let mut ctl = ready();
    let add = Push::MarkerAdd(MarkerAdd {
        id: MarkerId::from("a1"),
        name: "Alpha-01".into(),
        lat_lng: LatLng::new(30.0, -90.0),
    });
    let update = Push::MarkerUpdate(MarkerUpdate {
        id: MarkerId::from("a1"),
        name: Some("Alpha-01".into()),
        lat_lng: LatLng::new(31.0, -91.0),
    });
    let delete = Push::MarkerDelete(MarkerDelete { id: MarkerId::from("a1") });

    assert_eq!(logs(&ctl.apply_push(add, 1.0)), vec!["+ Alpha-01 appeared"]);
    assert_eq!(logs(&ctl.apply_push(update, 2.0)), vec!["→ Alpha-01 moved"]);
    assert_eq!(logs(&ctl.apply_push(delete, 3.0)), vec!["✕ Alpha-01 removed"]);
}

#[test]
fn apply_push_runs_commands() {
    let mut ctl = ready();
    let actions = ctl.apply_push(Push::Command(MapCommand::SetZoom { zoom: 7.0 }), 0.0);
    assert!(actions.is_empty());
    assert_eq!(map(&ctl).view().zoom, 7.0);
}

// =============================================================
// View commands
// =============================================================

#[test]
fn set_view_is_immediate() {
    let mut ctl = ready();
    assert!(ctl.apply_command(&MapCommand::SetView { lat_lng: LatLng::new(10.0, 20.0), zoom: 6.0 }));
    assert_eq!(map(&ctl).view(), View::new(LatLng::new(10.0, 20.0), 6.0));
    assert_eq!(map(&ctl).last_motion(), Some(Motion::Immediate));
}

#[test]
fn fly_to_is_animated() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::FlyTo { lat_lng: LatLng::new(10.0, 20.0), zoom: 6.0 });
    assert_eq!(map(&ctl).view(), View::new(LatLng::new(10.0, 20.0), 6.0));
    assert_eq!(map(&ctl).last_motion(), Some(Motion::Animated));
}

#[test]
fn set_view_clamps_zoom() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::SetView { lat_lng: LatLng::new(0.0, 0.0), zoom: 99.0 });
    assert_eq!(map(&ctl).view().zoom, crate::consts::MAX_ZOOM);
}

#[test]
fn fit_bounds_centers_on_box() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::FitBounds {
        corner1: LatLng::new(30.0, -100.0),
        corner2: LatLng::new(40.0, -80.0),
    });
    assert_eq!(map(&ctl).view().center, LatLng::new(35.0, -90.0));
    assert_eq!(map(&ctl).last_motion(), Some(Motion::Immediate));
}

#[test]
fn fly_to_bounds_is_animated() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::FlyToBounds {
        corner1: LatLng::new(40.0, -80.0),
        corner2: LatLng::new(30.0, -100.0),
    });
    assert_eq!(map(&ctl).view().center, LatLng::new(35.0, -90.0));
    assert_eq!(map(&ctl).last_motion(), Some(Motion::Animated));
}

#[test]
fn set_zoom_keeps_center() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::SetZoom { zoom: 11.0 });
    assert_eq!(map(&ctl).view().center, View::home().center);
    assert_eq!(map(&ctl).view().zoom, 11.0);
}

#[test]
fn reset_view_restores_home_from_anywhere() {
    let mut ctl = ready();
    for command in [
        MapCommand::SetView { lat_lng: LatLng::new(-33.9, 151.2), zoom: 12.0 },
        MapCommand::SetZoom { zoom: 1.0 },
        MapCommand::FitBounds { corner1: LatLng::new(0.0, 0.0), corner2: LatLng::new(1.0, 1.0) },
    ] {
        ctl.apply_command(&command);
        ctl.apply_command(&MapCommand::ResetView);
        let view = map(&ctl).view();
        assert_eq!(view.center, LatLng::new(39.5, -98.35));
        assert_eq!(view.zoom, 4.0);
    }
}

#[test]
fn reset_view_is_idempotent() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::ResetView);
    ctl.apply_command(&MapCommand::ResetView);
    assert_eq!(map(&ctl).view(), View::home());
}

#[test]
fn executed_command_reports_true_even_without_view_change() {
    let mut ctl = ready();
    assert_eq!(map(&ctl).view(), View::home());
    assert!(ctl.apply_command(&MapCommand::ResetView));
    assert_eq!(map(&ctl).view(), View::home());
}

#[test]
fn highlight_pans_and_opens_label() {
    let mut ctl = ready();
    ctl.apply_command(&MapCommand::SetZoom { zoom: 8.0 });
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);

    assert!(ctl.apply_command(&MapCommand::HighlightMarker { id: MarkerId::from("m1") }));
    let view = map(&ctl).view();
    assert_eq!(view.center, LatLng::new(10.0, 20.0));
    assert_eq!(view.zoom, 8.0);
    assert_eq!(map(&ctl).last_motion(), Some(Motion::Animated));
    let (_, overlay) = map(&ctl).overlay_by_key(&key("m1")).expect("attached");
    assert!(overlay.label_open);
}

#[test]
fn highlight_follows_dragged_position() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);
    let handle = *ctl.registry().and_then(|r| r.lookup(&key("m1"))).expect("registered");
    ctl.map_mut().expect("ready").drag_overlay(handle, LatLng::new(12.0, 22.0));

    ctl.apply_command(&MapCommand::HighlightMarker { id: MarkerId::from("m1") });
    assert_eq!(map(&ctl).view().center, LatLng::new(12.0, 22.0));
}

#[test]
fn highlight_unknown_changes_nothing() {
    let mut ctl = ready();
    let before = map(&ctl).view();
    assert!(!ctl.apply_command(&MapCommand::HighlightMarker { id: MarkerId::from("zzz") }));
    assert_eq!(map(&ctl).view(), before);
    assert_eq!(map(&ctl).view_changes(), 0);
}

#[test]
fn commands_before_ready_are_dropped() {
    let mut ctl = Controller::default();
    assert!(!ctl.apply_command(&MapCommand::SetZoom { zoom: 3.0 }));
    ctl.initialize(HeadlessContainer, 0.0);
    assert_eq!(map(&ctl).view(), View::home());
}

// =============================================================
// Map events
// =============================================================

#[test]
fn map_event_carries_current_view() {
    let mut ctl = ready();
    ctl.map_mut().expect("ready").pan_to(View::new(LatLng::new(1.0, 2.0), 5.0));
    let actions = ctl.on_map_event(MapEventKind::Click, Some(LatLng::new(3.0, 4.0)), 0.0);
    assert_eq!(
        sent(&actions),
        vec![&ClientEvent::Map(frames::MapEventPayload {
            event: "click".into(),
            lat_lng: Some(LatLng::new(3.0, 4.0)),
            center: LatLng::new(1.0, 2.0),
            zoom: 5.0,
        })]
    );
}

#[test]
fn map_event_without_coordinate_has_null_latlng() {
    let mut ctl = ready();
    let actions = ctl.on_map_event(MapEventKind::ZoomEnd, None, 0.0);
    let events = sent(&actions);
    let [ClientEvent::Map(payload)] = events[..] else {
        panic!("expected one map event, got {actions:?}");
    };
    assert_eq!(payload.event, "zoomend");
    assert!(payload.lat_lng.is_none());
}

#[test]
fn pointer_motion_is_throttled_to_one_per_second() {
    let mut ctl = ready();
    let p = Some(LatLng::new(0.0, 0.0));
    assert_eq!(sent(&ctl.on_map_event(MapEventKind::MouseMove, p, 1_000.0)).len(), 1);
    assert!(ctl.on_map_event(MapEventKind::MouseMove, p, 1_500.0).is_empty());
    assert!(ctl.on_map_event(MapEventKind::MouseMove, p, 1_999.0).is_empty());
    let later = ctl.on_map_event(MapEventKind::MouseMove, p, 2_000.0);
    let events = sent(&later);
    let [ClientEvent::Map(payload)] = events[..] else {
        panic!("expected one map event, got {later:?}");
    };
    assert_eq!(payload.event, "mousemove");
}

#[test]
fn throttle_does_not_affect_other_events() {
    let mut ctl = ready();
    ctl.on_map_event(MapEventKind::MouseMove, None, 0.0);
    assert_eq!(sent(&ctl.on_map_event(MapEventKind::Click, None, 10.0)).len(), 1);
    assert_eq!(sent(&ctl.on_map_event(MapEventKind::Click, None, 20.0)).len(), 1);
}

#[test]
fn continuous_map_events_are_suppressed() {
    let mut ctl = ready();
    for kind in [MapEventKind::Move, MapEventKind::MoveStart, MapEventKind::Zoom, MapEventKind::ZoomStart] {
        assert!(ctl.on_map_event(kind, None, 0.0).is_empty(), "{kind} forwarded");
    }
}

#[test]
fn map_events_before_ready_are_dropped() {
    let mut ctl = Controller::default();
    assert!(ctl.on_map_event(MapEventKind::Click, None, 0.0).is_empty());
}

// =============================================================
// Marker events
// =============================================================

#[test]
fn marker_event_reads_position_at_fire_time() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);
    let handle = *ctl.registry().and_then(|r| r.lookup(&key("m1"))).expect("registered");
    ctl.map_mut().expect("ready").drag_overlay(handle, LatLng::new(15.0, 25.0));

    let actions = ctl.on_marker_event(&key("m1"), MarkerEventKind::DragEnd);
    assert_eq!(
        sent(&actions),
        vec![&ClientEvent::Marker(MarkerEventPayload {
            event: "dragend".into(),
            id: MarkerId::from("m1"),
            name: "A".into(),
            lat_lng: LatLng::new(15.0, 25.0),
        })]
    );
}

#[test]
fn drag_in_progress_never_forwarded() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 10.0, 20.0), 0.0);
    assert!(ctl.on_marker_event(&key("m1"), MarkerEventKind::Drag).is_empty());
    assert!(ctl.on_marker_event(&key("m1"), MarkerEventKind::Move).is_empty());
    assert_eq!(sent(&ctl.on_marker_event(&key("m1"), MarkerEventKind::DragStart)).len(), 1);
    assert_eq!(sent(&ctl.on_marker_event(&key("m1"), MarkerEventKind::DragEnd)).len(), 1);
}

#[test]
fn marker_event_carries_raw_id() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("abc", "A", 0.0, 0.0), 0.0);
    let actions = ctl.on_marker_event(&key("abc"), MarkerEventKind::Click);
    let events = sent(&actions);
    let [ClientEvent::Marker(payload)] = events[..] else {
        panic!("expected one marker event, got {actions:?}");
    };
    assert_eq!(payload.id.as_str(), "abc");
}

#[test]
fn event_from_removed_marker_is_dropped() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 0.0, 0.0), 0.0);
    ctl.on_lifecycle(destroyed("m1"), 1.0);
    assert!(ctl.on_marker_event(&key("m1"), MarkerEventKind::Click).is_empty());
}

// =============================================================
// Terminator task
// =============================================================

#[test]
fn terminator_refreshes_at_init_then_every_minute() {
    let mut ctl = Controller::default();
    ctl.initialize(HeadlessContainer, 100.0);
    assert_eq!(map(&ctl).terminator_refreshes(), &[100.0]);

    assert!(!ctl.tick(30_000.0));
    assert!(ctl.tick(60_100.0));
    assert!(!ctl.tick(60_200.0));
    assert!(ctl.tick(120_100.0));
    assert_eq!(map(&ctl).terminator_refreshes(), &[100.0, 60_100.0, 120_100.0]);
    assert_eq!(ctl.next_tick_ms(), Some(180_100.0));
}

#[test]
fn tick_before_ready_does_nothing() {
    let mut ctl = Controller::default();
    assert!(!ctl.tick(1_000_000.0));
}

#[test]
fn teardown_returns_map() {
    let mut ctl = ready();
    ctl.on_lifecycle(created("m1", "A", 0.0, 0.0), 0.0);
    let map = ctl.teardown().expect("map existed");
    assert_eq!(map.overlay_count(), 1);
}

#[test]
fn teardown_before_ready_returns_none() {
    let mut ctl = Controller::default();
    ctl.on_lifecycle(created("m1", "A", 0.0, 0.0), 0.0);
    assert!(ctl.teardown().is_none());
}
