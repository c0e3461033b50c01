//! Headless map session over the server websocket.
//!
//! DESIGN
//! ======
//! `Session` hosts a `MapController<HeadlessMap>` exactly as a browser page
//! would: pushes from the socket feed the controller, its `Send` actions go
//! back out on the socket, and its `Log` actions land in an `ActivityLog`
//! that the terminal prints. The map becomes ready after `--ready-after-ms`
//! so pushes that arrive first exercise the pending queue.
//!
//! A headless map fires no pointer events. After every executed view command
//! the session reports `moveend`, as the real widget does.

use std::time::{Duration, Instant};

use frames::{ClientEvent, Push};
use futures_util::{SinkExt, StreamExt};
use mapsync::activity::{ActivityLog, LogEntry};
use mapsync::config::MapConfig;
use mapsync::controller::{Action, MapController};
use mapsync::headless::{HeadlessContainer, HeadlessMap};
use mapsync::relay::MapEventKind;
use mapsync::surface::MapSurface;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::CliError;

// =============================================================================
// SESSION
// =============================================================================

/// What one input produced for the host.
#[derive(Debug, Default, PartialEq)]
pub struct Step {
    pub outbound: Vec<ClientEvent>,
    pub logged: Vec<LogEntry>,
}

pub struct Session {
    controller: MapController<HeadlessMap>,
    log: ActivityLog,
}

impl Session {
    pub fn new(config: MapConfig) -> Self {
        Self { controller: MapController::new(config), log: ActivityLog::new() }
    }

    /// Create the map and flush buffered markers onto it.
    pub fn initialize(&mut self, now_ms: f64) -> Step {
        let actions = self.controller.initialize(HeadlessContainer, now_ms);
        self.absorb(actions)
    }

    /// Decode and apply one text frame from the server.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Decode`] for frames that are not pushes.
    pub fn on_text(&mut self, text: &str, now_ms: f64) -> Result<Step, CliError> {
        let push = frames::decode_push(text)?;
        Ok(self.on_push(push, now_ms))
    }

    pub fn on_push(&mut self, push: Push, now_ms: f64) -> Step {
        let actions = match push {
            Push::Command(command) => {
                if self.controller.apply_command(&command) {
                    self.controller.on_map_event(MapEventKind::MoveEnd, None, now_ms)
                } else {
                    Vec::new()
                }
            }
            other => self.controller.apply_push(other, now_ms),
        };
        self.absorb(actions)
    }

    /// Drive the terminator task. Returns whether it fired.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.controller.tick(now_ms)
    }

    pub fn is_ready(&self) -> bool {
        self.controller.is_ready()
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Markers on the map, or buffered while it is not ready.
    pub fn marker_count(&self) -> usize {
        self.controller.registry().map_or_else(|| self.controller.pending_len(), |r| r.len())
    }

    pub fn map(&self) -> Option<&HeadlessMap> {
        self.controller.map()
    }

    fn absorb(&mut self, actions: Vec<Action>) -> Step {
        let mut step = Step::default();
        for action in actions {
            match action {
                Action::Send(event) => step.outbound.push(event),
                Action::Log(entry) => {
                    self.log.record(entry.clone());
                    step.logged.push(entry);
                }
            }
        }
        step
    }
}

// =============================================================================
// RUN
// =============================================================================

pub struct WatchArgs {
    pub ready_after_ms: u64,
    pub duration_secs: Option<u64>,
}

pub async fn run(base_url: &str, args: WatchArgs) -> Result<(), CliError> {
    let url = crate::ws_url(base_url)?;
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;
    eprintln!("connected; map ready in {} ms", args.ready_after_ms);

    let started = Instant::now();
    let now_ms = || started.elapsed().as_secs_f64() * 1000.0;
    let mut session = Session::new(MapConfig::default());

    let ready_at = tokio::time::sleep(Duration::from_millis(args.ready_after_ms));
    tokio::pin!(ready_at);
    let deadline = tokio::time::sleep(args.duration_secs.map_or(Duration::MAX, Duration::from_secs));
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        let step = tokio::select! {
            () = &mut ready_at, if !session.is_ready() => {
                let step = session.initialize(now_ms());
                eprintln!("map ready with {} markers", session.marker_count());
                step
            }
            _ = ticker.tick() => {
                if session.tick(now_ms()) {
                    eprintln!("terminator refreshed");
                }
                continue;
            }
            () = &mut deadline => break,
            message = stream.next() => {
                let Some(message) = message else { break };
                match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
                    Message::Text(text) => match session.on_text(text.as_str(), now_ms()) {
                        Ok(step) => step,
                        Err(e) => {
                            eprintln!("skipping frame: {e}");
                            continue;
                        }
                    },
                    Message::Close(_) => break,
                    _ => continue,
                }
            }
        };

        for entry in &step.logged {
            println!("{:>10.0} ms  {}", entry.at_ms, entry.message);
        }
        for event in &step.outbound {
            let text = frames::encode_event(event)?;
            stream
                .send(Message::text(text))
                .await
                .map_err(|error| CliError::WsConnect(Box::new(error)))?;
        }
    }

    eprintln!("session ended: {} markers, {} log entries", session.marker_count(), session.log().len());
    if let Some(map) = session.map() {
        let view = map.view();
        eprintln!("final view: [{}, {}] zoom {}", view.center.lat, view.center.lng, view.zoom);
    }
    Ok(())
}

#[cfg(test)]
#[path = "watch_test.rs"]
mod tests;
