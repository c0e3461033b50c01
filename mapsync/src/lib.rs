//! Marker-map synchronization engine.
//!
//! This crate keeps a map widget's marker overlays consistent with a
//! server-driven stream of marker insertions, moves and deletions, and turns
//! native map/marker interaction events into a throttled, schema-stable
//! outbound event stream. It never renders and never does I/O: the host owns
//! the map widget (reached through [`surface::MapSurface`]), the transport
//! and the clock, and acts on the [`controller::Action`]s the engine returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | Per-session engine: readiness state machine and command dispatch |
//! | [`lifecycle`] | Marker element snapshots and lifecycle notification routing |
//! | [`overlay`] | Overlay factory |
//! | [`registry`] | Key → live overlay handle mapping |
//! | [`pending`] | Creation requests buffered until the map exists |
//! | [`relay`] | Native event vocabulary, forwarding policy and throttling |
//! | [`surface`] | Map widget seam |
//! | [`headless`] | In-memory map surface for tests and terminal hosts |
//! | [`view`] | Center/zoom value type and bounds fitting |
//! | [`activity`] | Human-readable activity log |
//! | [`timer`] | Cancellable repeating task on the host clock |
//! | [`config`] | Engine tunables |
//! | [`consts`] | Shared numeric constants (home view, throttle window, etc.) |

pub mod activity;
pub mod config;
pub mod consts;
pub mod controller;
pub mod headless;
pub mod lifecycle;
pub mod overlay;
pub mod pending;
pub mod registry;
pub mod relay;
pub mod surface;
pub mod timer;
pub mod view;
