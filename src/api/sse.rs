//! Server-Sent Events support

use crate::runtime::SseEvent;
use crate::state_machine::Session;
use crate::transcript::ChatMessage;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Snapshot sent first on every new stream
pub struct InitSnapshot {
    pub session: Session,
    pub messages: Vec<ChatMessage>,
}

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init: InitSnapshot,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(to_axum(
            "init",
            json!({
                "type": "init",
                "session": init.session,
                "messages": init.messages,
            }),
        ))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Event name and JSON payload for a runtime event
pub fn sse_event_payload(event: SseEvent) -> (&'static str, Value) {
    match event {
        SseEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        SseEvent::Typing => ("typing", json!({ "type": "typing" })),
        SseEvent::Speak(cue) => (
            "speak",
            json!({
                "type": "speak",
                "text": cue.text,
                "locale": cue.locale,
                "rate": cue.rate,
                "pitch": cue.pitch
            }),
        ),
        SseEvent::Sound(sound) => (
            "sound",
            json!({
                "type": "sound",
                "sound": sound
            }),
        ),
        SseEvent::Music { playing } => (
            "music",
            json!({
                "type": "music",
                "playing": playing
            }),
        ),
        SseEvent::LocationRequest => ("location_request", json!({ "type": "location_request" })),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = sse_event_payload(event);
    to_axum(event_type, data)
}

fn to_axum(event_type: &str, data: Value) -> Event {
    Event::default().event(event_type).data(data.to_string())
}
