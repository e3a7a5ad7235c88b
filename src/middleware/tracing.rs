// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Creates one span per HTTP request carrying a request id, method, and path
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use axum::http::{HeaderMap, Request};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

/// Header clients may use to supply their own correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id from `x-request-id`, or a fresh one
#[must_use]
pub fn request_id(request_headers: &HeaderMap) -> String {
    request_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map_or_else(
            || format!("req_{}", Uuid::new_v4().simple()),
            str::to_owned,
        )
}

/// Span factory for [`TraceLayer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            request_id = %request_id(request.headers()),
            http.method = %request.method(),
            http.path = %request.uri().path(),
        )
    }
}

/// HTTP trace layer used by the server router
#[must_use]
pub fn request_tracing(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, (), DefaultOnResponse> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_request(())
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_prefers_header() {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req_abc"));
        assert_eq!(request_id(&request_headers), "req_abc");
    }

    #[test]
    fn test_request_id_generated() {
        let id = request_id(&HeaderMap::new());
        assert!(id.starts_with("req_"));
        assert_ne!(id, request_id(&HeaderMap::new()));
    }
}
