//! JSON-RPC 2.0 endpoint for external tools.
//!
//! DESIGN
//! ======
//! `POST /api/rpc` takes one request object and always answers with HTTP 200
//! and a JSON-RPC response. Failures are carried in the `error` member with
//! the standard numeric codes:
//! - `-32700` body is not JSON
//! - `-32600` JSON is not a request object
//! - `-32601` unknown method
//! - `-32602` params missing, malformed, or rejected by the marker source
//!
//! Methods:
//! - `markers.add` `{id, name, latLng}`
//! - `markers.update` `{id, name?, latLng}`
//! - `markers.delete` `{id}`
//! - `markers.list` → `{markers: [...]}`
//! - `map.<command>` with the command's fields, e.g. `map.flyTo {latLng, zoom}`

use axum::Json;
use axum::extract::State;
use frames::{JSONRPC_VERSION, MarkerAdd, MarkerId, MarkerUpdate, RpcRequest, RpcResponse};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::services::markers::MarkerError;
use crate::services::{commands, markers};
use crate::state::AppState;

// =============================================================================
// ERRORS
// =============================================================================

/// Numeric JSON-RPC error code for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> i64;
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Marker(#[from] MarkerError),
}

impl ErrorCode for RpcError {
    fn error_code(&self) -> i64 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) | Self::Marker(_) => -32602,
        }
    }
}

#[derive(Deserialize)]
struct DeleteParams {
    id: MarkerId,
}

// =============================================================================
// HANDLER
// =============================================================================

pub async fn handle_rpc(State(state): State<AppState>, body: String) -> Json<RpcResponse> {
    Json(respond(&state, &body).await)
}

/// Decode one request body, run it, and build the response.
pub async fn respond(state: &AppState, body: &str) -> RpcResponse {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return error_response(Value::Null, &RpcError::Parse(e.to_string())),
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return error_response(id, &RpcError::InvalidRequest(e.to_string())),
    };
    if request.jsonrpc != JSONRPC_VERSION {
        let err = RpcError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc));
        return error_response(request.id, &err);
    }

    match dispatch(state, &request.method, request.params).await {
        Ok(result) => RpcResponse::ok(request.id, result),
        Err(e) => error_response(request.id, &e),
    }
}

fn error_response(id: Value, err: &RpcError) -> RpcResponse {
    warn!(code = err.error_code(), error = %err, "rpc: request failed");
    RpcResponse::err(id, err.error_code(), err.to_string())
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run one method call.
///
/// # Errors
///
/// Returns [`RpcError`] for unknown methods and bad params.
pub async fn dispatch(state: &AppState, method: &str, params: Value) -> Result<Value, RpcError> {
    debug!(method, "rpc: dispatch");
    match method {
        "markers.add" => {
            let MarkerAdd { id, name, lat_lng } = parse_params(params)?;
            markers::add(state, id, name, lat_lng).await?;
            Ok(json!({ "ok": true }))
        }
        "markers.update" => {
            let MarkerUpdate { id, name, lat_lng } = parse_params(params)?;
            markers::update(state, id, name, lat_lng).await?;
            Ok(json!({ "ok": true }))
        }
        "markers.delete" => {
            let DeleteParams { id } = parse_params(params)?;
            markers::delete(state, id).await?;
            Ok(json!({ "ok": true }))
        }
        "markers.list" => Ok(json!({ "markers": markers::list(state).await })),
        _ => {
            let Some(name) = method.strip_prefix("map.").filter(|n| commands::COMMAND_NAMES.contains(n)) else {
                return Err(RpcError::MethodNotFound(method.to_owned()));
            };
            let command = commands::parse(name, params).map_err(|e| RpcError::InvalidParams(e.to_string()))?;
            let sessions = commands::issue(state, command);
            Ok(json!({ "ok": true, "sessions": sessions }))
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::InvalidParams(e.to_string()))
}

#[cfg(test)]
#[path = "rpc_test.rs"]
mod tests;
