//! View command queue: commands from external clients, delivered to every
//! connected map session.

use frames::{MapCommand, Push};
use serde_json::Value;
use tracing::{debug, info};

use crate::state::AppState;

/// Wire names accepted after the `map.` method prefix.
pub const COMMAND_NAMES: &[&str] =
    &["setView", "flyTo", "fitBounds", "flyToBounds", "setZoom", "resetView", "highlightMarker"];

/// Build a command from its wire name and JSON-RPC params.
///
/// # Errors
///
/// Returns a serde error if `params` is not an object or lacks the fields the
/// command needs.
pub fn parse(name: &str, params: Value) -> Result<MapCommand, serde_json::Error> {
    let mut fields = match params {
        Value::Object(fields) => fields,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(serde::de::Error::custom(format!("params must be an object, got {other}")));
        }
    };
    fields.insert("command".to_owned(), Value::String(name.to_owned()));
    serde_json::from_value(Value::Object(fields))
}

/// Deliver `command` to every map session. Returns how many received it.
pub fn issue(state: &AppState, command: MapCommand) -> usize {
    let name = command.name();
    match state.push_tx.send(Push::Command(command)) {
        Ok(sessions) => {
            info!(command = name, sessions, "view command issued");
            sessions
        }
        Err(_) => {
            debug!(command = name, "no map sessions connected; command dropped");
            0
        }
    }
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
