//! Mock marker generator: simulated live tracking over the continental US.
//!
//! DESIGN
//! ======
//! The generator owns its own marker set with motion state (heading, speed).
//! Each tick it picks one operation, weighted 6 move : 2 add : 1 delete, with
//! adds disabled at `MAX_MARKERS` and deletes disabled at `MIN_MARKERS`.
//! Moving markers step along their `frames::motion::Track`, the same model
//! `dmap-cli mock` uses. The background task feeds every operation through the
//! marker source so sessions and event subscribers see it like any other
//! change.

use std::time::Duration;

use frames::motion::Track;
use frames::{LatLng, MarkerId, motion};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MockConfig;
use crate::services::markers;
use crate::state::AppState;

// ── Population ──────────────────────────────────────────────────

pub const MIN_MARKERS: usize = 2;
pub const MAX_MARKERS: usize = 120;

// =============================================================================
// TYPES
// =============================================================================

/// A generated marker with motion state.
#[derive(Debug, Clone, PartialEq)]
pub struct MockMarker {
    pub id: MarkerId,
    pub name: String,
    pub track: Track,
}

/// One generated change.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Add { id: MarkerId, name: String, lat_lng: LatLng },
    Update { id: MarkerId, name: String, lat_lng: LatLng },
    Delete { id: MarkerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpChoice {
    Move,
    Add,
    Delete,
}

// =============================================================================
// GENERATOR
// =============================================================================

#[derive(Debug, Default)]
pub struct MockGenerator {
    markers: Vec<MockMarker>,
    created: usize,
}

impl MockGenerator {
    /// Create a generator seeded with `initial` random markers.
    pub fn new(initial: usize, rng: &mut impl Rng) -> Self {
        let mut generator = Self::default();
        for _ in 0..initial {
            generator.create_marker(rng);
        }
        generator
    }

    #[must_use]
    pub fn markers(&self) -> &[MockMarker] {
        &self.markers
    }

    /// Produce the next change and apply it to the generator's own set.
    pub fn next_op(&mut self, rng: &mut impl Rng) -> MockOp {
        let n = self.markers.len();
        let mut choices = vec![OpChoice::Move; 6];
        if n < MAX_MARKERS {
            choices.extend([OpChoice::Add; 2]);
        }
        if n > MIN_MARKERS {
            choices.push(OpChoice::Delete);
        }
        let choice = choices.choose(rng).copied().unwrap_or(OpChoice::Add);

        match (choice, self.markers.is_empty()) {
            (OpChoice::Move, false) => {
                let index = rng.random_range(0..n);
                let marker = &mut self.markers[index];
                marker.track.advance(rng);
                MockOp::Update { id: marker.id.clone(), name: marker.name.clone(), lat_lng: marker.track.lat_lng }
            }
            (OpChoice::Delete, false) => {
                let index = rng.random_range(0..n);
                let marker = self.markers.remove(index);
                MockOp::Delete { id: marker.id }
            }
            _ => {
                let marker = self.create_marker(rng);
                MockOp::Add { id: marker.id.clone(), name: marker.name.clone(), lat_lng: marker.track.lat_lng }
            }
        }
    }

    fn create_marker(&mut self, rng: &mut impl Rng) -> &MockMarker {
        let name = motion::unit_name(self.created);
        self.created += 1;

        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        let index = self.markers.len();
        self.markers.push(MockMarker { id: MarkerId::from(id), name, track: Track::random(rng) });
        &self.markers[index]
    }
}

// =============================================================================
// BACKGROUND TASK
// =============================================================================

/// Seed the marker source and drive it from a generator until the process
/// exits.
pub fn spawn_mock_task(state: AppState, config: MockConfig) -> JoinHandle<()> {
    info!(initial = config.initial, tick_ms = config.tick_ms, "mock generator enabled");
    tokio::spawn(async move {
        let mut rng = StdRng::from_os_rng();
        let mut generator = MockGenerator::new(config.initial, &mut rng);
        for marker in generator.markers() {
            if let Err(e) = markers::add(&state, marker.id.clone(), marker.name.clone(), marker.track.lat_lng).await {
                warn!(error = %e, "mock seed marker rejected");
            }
        }

        tokio::time::sleep(Duration::from_millis(config.warmup_ms)).await;
        let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms));
        loop {
            ticker.tick().await;
            let op = generator.next_op(&mut rng);
            if let Err(e) = apply(&state, op).await {
                warn!(error = %e, "mock op rejected");
            }
        }
    })
}

/// Feed one generated op through the marker source.
///
/// # Errors
///
/// Propagates [`markers::MarkerError`] from the marker source.
pub async fn apply(state: &AppState, op: MockOp) -> Result<(), markers::MarkerError> {
    match op {
        MockOp::Add { id, name, lat_lng } => markers::add(state, id, name, lat_lng).await,
        MockOp::Update { id, name, lat_lng } => markers::update(state, id, Some(name), lat_lng).await.map(|_| ()),
        MockOp::Delete { id } => markers::delete(state, id).await.map(|_| ()),
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
