//! Marker source: the shared marker set and its change stream.
//!
//! DESIGN
//! ======
//! Every mutation updates the shared set, then broadcasts the matching push
//! to all map sessions and publishes a `marker-op` event. Sessions that
//! connect later receive the current set as a burst of `dmarker-add` pushes.
//!
//! An update for an unknown id still goes out on the push channel. Clients
//! ignore updates for markers they do not have.

use frames::{
    BroadcastEvent, LatLng, MarkerAdd, MarkerDelete, MarkerId, MarkerOpKind, MarkerOpPayload,
    MarkerUpdate, Push,
};
use tracing::{debug, info};

use crate::services::events;
use crate::state::{AppState, Marker};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MarkerError {
    #[error("marker id must not be empty")]
    EmptyId,
    #[error("invalid coordinates: [{lat}, {lng}]")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

fn validate_id(id: &MarkerId) -> Result<(), MarkerError> {
    if id.as_str().trim().is_empty() {
        return Err(MarkerError::EmptyId);
    }
    Ok(())
}

fn validate_lat_lng(lat_lng: LatLng) -> Result<(), MarkerError> {
    let LatLng { lat, lng } = lat_lng;
    if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(MarkerError::InvalidCoordinates { lat, lng });
    }
    Ok(())
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Add a marker, replacing any marker with the same id.
///
/// # Errors
///
/// Returns [`MarkerError`] for an empty id or out-of-range coordinates.
pub async fn add(state: &AppState, id: MarkerId, name: String, lat_lng: LatLng) -> Result<(), MarkerError> {
    validate_id(&id)?;
    validate_lat_lng(lat_lng)?;

    state.markers.write().await.upsert(Marker { id: id.clone(), name: name.clone(), lat_lng });
    info!(%id, %name, "marker added");

    events::publish(
        state,
        BroadcastEvent::MarkerOp(MarkerOpPayload {
            op: MarkerOpKind::Add,
            id: id.clone(),
            name: Some(name.clone()),
            lat_lng: Some(lat_lng),
        }),
    );
    broadcast(state, Push::MarkerAdd(MarkerAdd { id, name, lat_lng }));
    Ok(())
}

/// Move a marker. Returns whether the id was known; unknown ids are still
/// broadcast.
///
/// # Errors
///
/// Returns [`MarkerError`] for an empty id or out-of-range coordinates.
pub async fn update(
    state: &AppState,
    id: MarkerId,
    name: Option<String>,
    lat_lng: LatLng,
) -> Result<bool, MarkerError> {
    validate_id(&id)?;
    validate_lat_lng(lat_lng)?;

    let (known, name) = {
        let mut markers = state.markers.write().await;
        let known = markers.relocate(&id, lat_lng);
        let name = name.or_else(|| markers.get(&id).map(|m| m.name.clone()));
        (known, name)
    };
    if known {
        debug!(%id, "marker moved");
    } else {
        debug!(%id, "update for unknown marker broadcast anyway");
    }

    events::publish(
        state,
        BroadcastEvent::MarkerOp(MarkerOpPayload {
            op: MarkerOpKind::Update,
            id: id.clone(),
            name: name.clone(),
            lat_lng: Some(lat_lng),
        }),
    );
    broadcast(state, Push::MarkerUpdate(MarkerUpdate { id, name, lat_lng }));
    Ok(known)
}

/// Remove a marker. Returns whether the id was known.
///
/// # Errors
///
/// Returns [`MarkerError::EmptyId`] for an empty id.
pub async fn delete(state: &AppState, id: MarkerId) -> Result<bool, MarkerError> {
    validate_id(&id)?;

    let removed = state.markers.write().await.remove(&id);
    if let Some(marker) = &removed {
        info!(%id, name = %marker.name, "marker deleted");
    }

    events::publish(
        state,
        BroadcastEvent::MarkerOp(MarkerOpPayload { op: MarkerOpKind::Delete, id: id.clone(), name: None, lat_lng: None }),
    );
    broadcast(state, Push::MarkerDelete(MarkerDelete { id }));
    Ok(removed.is_some())
}

/// Snapshot of the current markers in insertion order.
pub async fn list(state: &AppState) -> Vec<Marker> {
    state.markers.read().await.to_vec()
}

/// The current markers as `dmarker-add` pushes, for a newly connected session.
pub async fn snapshot_pushes(state: &AppState) -> Vec<Push> {
    list(state)
        .await
        .into_iter()
        .map(|m| Push::MarkerAdd(MarkerAdd { id: m.id, name: m.name, lat_lng: m.lat_lng }))
        .collect()
}

fn broadcast(state: &AppState, push: Push) {
    if state.push_tx.send(push).is_err() {
        debug!("no map sessions connected");
    }
}

#[cfg(test)]
#[path = "markers_test.rs"]
mod tests;
