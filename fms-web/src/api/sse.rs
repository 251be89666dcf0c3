//! Server-Sent Events (SSE) for controller state changes

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE stream of controller state changes
///
/// The page re-fetches `/ui/view` on every event.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    fms_common::sse::create_event_sse_stream("fms-web", &state.event_bus)
}
