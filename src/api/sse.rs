//! Server-Sent Events support

use crate::runtime::SessionEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SessionEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(init_event)) });

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

fn event_payload(event: SessionEvent) -> (&'static str, Value) {
    match event {
        SessionEvent::Init { session, messages } => (
            "init",
            json!({
                "type": "init",
                "session": session,
                "messages": messages
            }),
        ),
        SessionEvent::Reply {
            text,
            source,
            speak,
        } => (
            "reply",
            json!({
                "type": "reply",
                "text": text,
                "source": source,
                "speak": speak
            }),
        ),
        SessionEvent::Cleared => ("cleared", json!({ "type": "cleared" })),
    }
}

fn sse_event_to_axum(event: SessionEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ReplySource;

    #[test]
    fn test_reply_payload() {
        let (name, data) = event_payload(SessionEvent::Reply {
            text: "تمام".to_string(),
            source: ReplySource::Remote,
            speak: true,
        });
        assert_eq!(name, "reply");
        assert_eq!(
            data,
            json!({"type": "reply", "text": "تمام", "source": "remote", "speak": true})
        );
    }

    #[test]
    fn test_cleared_payload() {
        let (name, data) = event_payload(SessionEvent::Cleared);
        assert_eq!(name, "cleared");
        assert_eq!(data["type"], "cleared");
    }
}
