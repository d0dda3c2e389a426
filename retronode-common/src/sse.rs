//! Server-Sent Events (SSE) utilities
//!
//! Turns an EventBus subscription into an axum SSE response.

use crate::events::{EventBus, LibraryEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Heartbeat interval shared by every stream
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Stream events from `event_bus` that satisfy `filter`
///
/// Sends a `ConnectionStatus` event first so the browser can show a
/// connected indicator. Lagging receivers skip the dropped events and keep
/// streaming; the stream ends when the bus is closed.
///
/// # Example
/// ```rust,ignore
/// pub async fn scan_event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     retronode_common::sse::create_event_sse_stream(&state.event_bus, LibraryEvent::is_scan_event)
/// }
/// ```
pub fn create_event_sse_stream(
    event_bus: &EventBus,
    filter: fn(&LibraryEvent) -> bool,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected");

    let mut rx = event_bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !filter(&event) {
                        continue;
                    }
                    let event_type = event.event_type().to_string();
                    match serde_json::to_string(&event) {
                        Ok(event_json) => {
                            debug!("SSE: Broadcasting event: {}", event_type);
                            yield Ok(Event::default().event(event_type).data(event_json));
                        }
                        Err(e) => {
                            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: Client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("SSE: Event bus closed, ending stream");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
