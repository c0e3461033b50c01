//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router carries every surface: the session websocket that map
//! clients connect to, the JSON-RPC endpoint used by external tools, and the
//! SSE stream of interaction events.

pub mod rpc;
pub mod sse;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/rpc", post(rpc::handle_rpc))
        .route("/api/events", get(sse::handle_events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
