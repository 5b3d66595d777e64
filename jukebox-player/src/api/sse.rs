//! Server-Sent Events (SSE) broadcaster
//!
//! Streams session events to connected clients, either for every session or
//! filtered to one.

use super::AppState;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use jukebox_common::events::SessionEvent;
use jukebox_common::SessionId;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// GET /events - all sessions
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");
    stream_events(&state, None)
}

/// GET /sessions/:session_id/events
pub async fn session_event_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected for session {}", session_id);
    stream_events(&state, Some(SessionId::from(session_id)))
}

fn stream_events(
    state: &AppState,
    filter: Option<SessionId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.registry.events().subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let filter = filter.clone();
        async move {
            match result {
                Ok(event) => {
                    if filter.as_ref().is_some_and(|id| id != event.session_id()) {
                        return None;
                    }
                    to_sse(&event).map(Ok)
                }
                Err(e) => {
                    // Lagged receivers skip ahead
                    warn!("SSE stream error: {:?}", e);
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse(event: &SessionEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
