use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::config::ServerConfig;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn seeds_initial_markers_with_callsigns() {
    let generator = MockGenerator::new(5, &mut rng());
    let names: Vec<&str> = generator.markers().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha-01", "Bravo-02", "Charlie-03", "Delta-04", "Echo-05"]);
}

#[test]
fn ids_are_eight_hex_chars_and_unique() {
    let generator = MockGenerator::new(20, &mut rng());
    let mut ids: Vec<&str> = generator.markers().iter().map(|m| m.id.as_str()).collect();
    assert!(ids.iter().all(|id| id.len() == 8 && id.chars().all(|c| c.is_ascii_hexdigit())));
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[test]
fn names_keep_counting_after_deletes() {
    let mut rng = rng();
    let mut generator = MockGenerator::new(MAX_MARKERS, &mut rng);
    let mut names = std::collections::HashSet::new();
    for marker in generator.markers() {
        names.insert(marker.name.clone());
    }
    for _ in 0..500 {
        if let MockOp::Add { name, .. } = generator.next_op(&mut rng) {
            assert!(names.insert(name.clone()), "{name} reused");
        }
    }
}

#[test]
fn moves_keep_markers_in_box() {
    let mut rng = rng();
    let mut generator = MockGenerator::new(10, &mut rng);
    for _ in 0..1_000 {
        if let MockOp::Update { lat_lng, .. } | MockOp::Add { lat_lng, .. } = generator.next_op(&mut rng) {
            assert!(motion::in_box(lat_lng), "{lat_lng:?}");
        }
    }
}

#[test]
fn population_stays_within_limits() {
    let mut rng = rng();
    let mut generator = MockGenerator::new(MIN_MARKERS, &mut rng);
    for _ in 0..2_000 {
        generator.next_op(&mut rng);
        let n = generator.markers().len();
        assert!((MIN_MARKERS..=MAX_MARKERS).contains(&n), "{n}");
    }
}

#[test]
fn ops_match_generator_state() {
    let mut rng = rng();
    let mut generator = MockGenerator::new(5, &mut rng);
    for _ in 0..200 {
        match generator.next_op(&mut rng) {
            MockOp::Add { id, .. } | MockOp::Update { id, .. } => {
                assert!(generator.markers().iter().any(|m| m.id == id));
            }
            MockOp::Delete { id } => {
                assert!(generator.markers().iter().all(|m| m.id != id));
            }
        }
    }
}

#[test]
fn empty_generator_adds() {
    let mut rng = rng();
    let mut generator = MockGenerator::new(0, &mut rng);
    assert!(matches!(generator.next_op(&mut rng), MockOp::Add { .. }));
    assert_eq!(generator.markers().len(), 1);
}

#[tokio::test]
async fn apply_feeds_marker_source() {
    let state = AppState::new(&ServerConfig::default());
    let id = MarkerId::from("m1");
    apply(&state, MockOp::Add { id: id.clone(), name: "Alpha-01".into(), lat_lng: LatLng::new(30.0, -90.0) })
        .await
        .expect("add");
    apply(&state, MockOp::Update { id: id.clone(), name: "Alpha-01".into(), lat_lng: LatLng::new(31.0, -91.0) })
        .await
        .expect("update");
    assert_eq!(markers::list(&state).await[0].lat_lng, LatLng::new(31.0, -91.0));
    apply(&state, MockOp::Delete { id }).await.expect("delete");
    assert!(markers::list(&state).await.is_empty());
}
