// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds an in-process router over the mock data store and sends requests through it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `crm_mcp_server`

use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use crm_mcp_server::{
    server::McpServer,
    test_utils::{test_resources, MockDataStore, RecordingUsageSink, TEST_API_KEY},
};
use serde_json::Value;
use tower::ServiceExt;

pub const TENANT: &str = "brand-1";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// In-process gateway over test doubles
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockDataStore>,
    pub sink: Arc<RecordingUsageSink>,
}

impl TestApp {
    /// Gateway whose store accepts [`TEST_API_KEY`] with quota left
    pub fn new() -> Self {
        Self::with_store(MockDataStore::with_valid_key(TENANT, Some(100)))
    }

    /// Gateway over a caller-prepared store
    pub fn with_store(store: MockDataStore) -> Self {
        init_test_logging();
        let store = Arc::new(store);
        let sink = Arc::new(RecordingUsageSink::default());
        let resources = test_resources(Arc::clone(&store), Arc::clone(&sink));
        Self {
            router: McpServer::new(resources).router(),
            store,
            sink,
        }
    }

    /// Send a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// POST `body` to `path` with the test key
    pub async fn post(&self, path: &str, body: &str) -> TestResponse {
        self.send(post_request(path, body, Some(TEST_API_KEY))).await
    }

    /// GET `path` without credentials
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::GET)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// Buffered response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Body parsed as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }
}

/// JSON POST request, optionally carrying `x-api-key`
pub fn post_request(path: &str, body: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

/// JSON-RPC request text
pub fn rpc(id: i64, method: &str, params: &Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
    .to_string()
}

/// `tools/call` request text
pub fn tool_call(id: i64, name: &str, arguments: &Value) -> String {
    rpc(
        id,
        "tools/call",
        &serde_json::json!({ "name": name, "arguments": arguments }),
    )
}

/// Parse the JSON text inside a tool result's first content item
pub fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}
