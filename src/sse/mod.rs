// ABOUTME: Server-Sent Events stream builders for the streaming transport flavors
// ABOUTME: Session streams with keep-alive comments and a hard lifetime, and one-shot message streams
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # SSE Streams
//!
//! Two stream shapes are served:
//!
//! - **Session streams** (`GET /mcp`, `GET /sse`): an opening comment, any
//!   preamble events, then a keep-alive comment every interval until the
//!   configured ceiling, when the stream ends and the connection closes.
//! - **Message streams** (`POST` with `Accept: text/event-stream`): one
//!   `message` event per JSON-RPC response, then end of stream.
//!
//! No state is kept per session; the session id only labels the stream.

use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use futures_util::stream::{self, Stream};
use tokio::time::{interval_at, sleep_until, Instant};
use tracing::{debug, warn};

use crate::config::SseConfig;
use crate::jsonrpc::JsonRpcResponse;

/// Event name carrying JSON-RPC responses
pub const MESSAGE_EVENT: &str = "message";
/// Event name announcing the legacy POST channel
pub const ENDPOINT_EVENT: &str = "endpoint";

/// Fresh opaque session label
#[must_use]
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Legacy `endpoint` event pointing at the POST channel for `session_id`
#[must_use]
pub fn endpoint_event(messages_path: &str, session_id: &str) -> Event {
    Event::default()
        .event(ENDPOINT_EVENT)
        .data(format!("{messages_path}?sessionId={session_id}"))
}

/// Keep-alive session stream bounded by `config.max_stream_duration()`
pub fn session_stream(
    session_id: String,
    config: &SseConfig,
    preamble: Vec<Event>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let period = config.keepalive_interval();
    let deadline = Instant::now() + config.max_stream_duration();

    async_stream::stream! {
        debug!(session.id = %session_id, "SSE stream opened");
        yield Ok(Event::default().comment(format!("connected session={session_id}")));

        for event in preamble {
            yield Ok(event);
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            let alive = tokio::select! {
                _ = ticker.tick() => true,
                () = sleep_until(deadline) => false,
            };
            if !alive {
                break;
            }
            yield Ok(Event::default().comment("keep-alive"));
        }

        debug!(session.id = %session_id, "SSE stream reached its lifetime ceiling");
    }
}

/// One `message` event per response, then end of stream
pub fn message_stream(
    responses: Vec<JsonRpcResponse>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let events: Vec<Result<Event, Infallible>> = responses
        .iter()
        .filter_map(|response| match serde_json::to_string(response) {
            Ok(json) => Some(Ok(Event::default().event(MESSAGE_EVENT).data(json))),
            Err(e) => {
                warn!("Dropping unserializable JSON-RPC response: {e}");
                None
            }
        })
        .collect();
    stream::iter(events)
}

/// Wrap a stream as an SSE response
pub fn into_sse<S>(events: S) -> Sse<S>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_session_stream_ends_after_ceiling() {
        let config = SseConfig {
            keepalive_interval_secs: 1,
            max_stream_duration_secs: 2,
        };
        let started = std::time::Instant::now();
        let events: Vec<_> = session_stream("s1".into(), &config, vec![])
            .collect::<Vec<_>>()
            .await;

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(4));
        // opening comment plus at least one keep-alive
        assert!(events.len() >= 2);
    }

    #[tokio::test]
    async fn test_message_stream_emits_one_event_per_response() {
        let responses = vec![
            JsonRpcResponse::success(Some(json!(1)), json!({})),
            JsonRpcResponse::success(Some(json!(2)), json!({})),
        ];
        let events: Vec<_> = message_stream(responses).collect::<Vec<_>>().await;
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_session_ids_are_distinct() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
