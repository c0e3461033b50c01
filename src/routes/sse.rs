//! SSE stream of interaction events and marker ops.
//!
//! Each SSE `data:` line is one `notifications/map.event` JSON-RPC
//! notification, already serialized by the event broadcaster. Subscribers
//! that fall behind skip the missed events and keep streaming.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn handle_events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("sse: subscriber connected");
    let stream = BroadcastStream::new(state.event_tx.subscribe()).filter_map(|result| match result {
        Ok(text) => Some(Ok(Event::default().data(&*text))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "sse: subscriber lagged; events dropped");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(state.sse_keepalive_secs))
            .text("keep-alive"),
    )
}
