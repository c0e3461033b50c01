//! Domain services used by websocket, JSON-RPC and SSE routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the marker set, the command queue, event fan-out and
//! the mock feed so route handlers stay focused on protocol translation.

pub mod commands;
pub mod events;
pub mod markers;
pub mod mock;
