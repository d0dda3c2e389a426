//! Server-Sent Events for scan progress

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use retronode_common::events::LibraryEvent;
use std::convert::Infallible;

/// GET /api/scan-sessions/events
///
/// Streams ScanSessionStarted, ScanProgress, ScanSessionCompleted and
/// ScanSessionFailed for every session.
pub async fn scan_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    retronode_common::sse::create_event_sse_stream(&state.event_bus, LibraryEvent::is_scan_event)
}
