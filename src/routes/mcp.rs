// ABOUTME: Streamable HTTP and legacy POST endpoints carrying JSON-RPC to the protocol handler
// ABOUTME: Authenticates before parsing, handles batches, and answers in JSON or as SSE message frames
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # MCP Routes
//!
//! - `POST /mcp`: single message or batch. Replies as JSON, or as SSE
//!   `message` frames when the client accepts `text/event-stream`.
//! - `GET /mcp`: transport description, or a keep-alive session stream
//!   when the client accepts `text/event-stream`.
//! - `DELETE /mcp`: always 204; there is no session table.
//! - `POST /messages`: legacy alias of `POST /mcp`, always plain JSON.
//!
//! Every `/mcp` response carries an `Mcp-Session-Id` header, echoed from the
//! request or freshly minted.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{AuthContext, AuthRejection};
use crate::constants::{headers, paths, protocol, SERVER_VERSION};
use crate::jsonrpc::JsonRpcResponse;
use crate::mcp::resources::ServerResources;
use crate::sse;

/// Query string of the legacy POST channel
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    /// Session label issued by the `endpoint` event
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// MCP transport routes
pub struct McpRoutes;

impl McpRoutes {
    /// Create the Streamable HTTP and legacy POST routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                paths::MCP,
                post(Self::handle_post)
                    .get(Self::handle_get)
                    .delete(Self::handle_delete),
            )
            .route(paths::MESSAGES, post(Self::handle_messages))
            .with_state(resources)
    }

    async fn handle_post(
        State(resources): State<Arc<ServerResources>>,
        request_headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let session_id = session_id_from(&request_headers).unwrap_or_else(sse::new_session_id);
        let streaming = accepts_event_stream(&request_headers);
        let response = Self::dispatch(&resources, &request_headers, &body, streaming).await;
        with_session_header(response, &session_id)
    }

    async fn handle_messages(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<MessagesQuery>,
        request_headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        if let Some(session_id) = query.session_id.as_deref() {
            debug!(session.id = %session_id, "Legacy SSE POST");
        }
        Self::dispatch(&resources, &request_headers, &body, false).await
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        request_headers: HeaderMap,
    ) -> Response {
        if !accepts_event_stream(&request_headers) {
            return with_session_header(
                Json(transport_info()).into_response(),
                &session_id_from(&request_headers).unwrap_or_else(sse::new_session_id),
            );
        }

        if let Err(rejection) = authenticate(&resources, &request_headers).await {
            return rejection.into_response();
        }

        let session_id = sse::new_session_id();
        info!(session.id = %session_id, "Opened Streamable HTTP session stream");
        let stream = sse::session_stream(session_id.clone(), &resources.config.sse, Vec::new());
        with_session_header(sse::into_sse(stream).into_response(), &session_id)
    }

    async fn handle_delete(request_headers: HeaderMap) -> StatusCode {
        if let Some(session_id) = session_id_from(&request_headers) {
            debug!(session.id = %session_id, "Session termination acknowledged");
        }
        StatusCode::NO_CONTENT
    }

    /// Authenticate, parse, and hand the payload to the protocol handler
    async fn dispatch(
        resources: &ServerResources,
        request_headers: &HeaderMap,
        body: &[u8],
        streaming: bool,
    ) -> Response {
        let auth = match authenticate(resources, request_headers).await {
            Ok(auth) => auth,
            Err(rejection) => return rejection.into_response(),
        };

        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Unparseable JSON-RPC body: {e}");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(JsonRpcResponse::parse_error(e)),
                )
                    .into_response();
            }
        };

        match payload {
            Value::Array(messages) if messages.is_empty() => Json(
                JsonRpcResponse::invalid_request(None, "Invalid Request: empty batch"),
            )
            .into_response(),
            Value::Array(messages) => {
                let responses = resources.protocol.handle_batch(messages, &auth).await;
                if responses.is_empty() {
                    StatusCode::ACCEPTED.into_response()
                } else if streaming {
                    sse::into_sse(sse::message_stream(responses)).into_response()
                } else {
                    Json(responses).into_response()
                }
            }
            message => match resources.protocol.handle_value(message, &auth).await {
                Some(response) if streaming => {
                    sse::into_sse(sse::message_stream(vec![response])).into_response()
                }
                Some(response) => Json(response).into_response(),
                None => StatusCode::ACCEPTED.into_response(),
            },
        }
    }
}

/// Authenticate the request headers, mapping failures to an HTTP rejection
pub(crate) async fn authenticate(
    resources: &ServerResources,
    request_headers: &HeaderMap,
) -> Result<AuthContext, AuthRejection> {
    resources
        .authenticator
        .authenticate_headers(request_headers)
        .await
        .map_err(|failure| AuthRejection {
            failure,
            docs_url: resources.config.auth.docs_url.clone(),
        })
}

/// Whether the client asked for an event stream
#[must_use]
pub fn accepts_event_stream(request_headers: &HeaderMap) -> bool {
    request_headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(headers::EVENT_STREAM))
}

fn session_id_from(request_headers: &HeaderMap) -> Option<String> {
    request_headers
        .get(headers::MCP_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn with_session_header(mut response: Response, session_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(headers::MCP_SESSION_ID), value);
    }
    response
}

fn transport_info() -> Value {
    json!({
        "server": protocol::SERVER_NAME,
        "version": SERVER_VERSION,
        "protocolVersion": protocol::MCP_PROTOCOL_VERSION,
        "transports": {
            "streamable_http": {
                "endpoint": paths::MCP,
                "methods": ["GET", "POST", "DELETE"],
                "description": "POST JSON-RPC messages; GET with Accept: text/event-stream opens a session stream",
            },
            "sse": {
                "endpoint": paths::SSE,
                "messages": paths::MESSAGES,
                "description": "Legacy two-channel SSE; POST to the announced endpoint",
            },
        },
        "authentication": {
            "header": headers::API_KEY,
            "alternative": "Authorization: Bearer <api key>",
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_event_stream() {
        let mut request_headers = HeaderMap::new();
        assert!(!accepts_event_stream(&request_headers));

        request_headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );
        assert!(accepts_event_stream(&request_headers));
    }

    #[test]
    fn test_session_id_from_ignores_blank() {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(headers::MCP_SESSION_ID, HeaderValue::from_static("  "));
        assert_eq!(session_id_from(&request_headers), None);

        request_headers.insert(headers::MCP_SESSION_ID, HeaderValue::from_static("abc"));
        assert_eq!(session_id_from(&request_headers).as_deref(), Some("abc"));
    }
}
