// ABOUTME: MCP protocol handler mapping one JSON-RPC message to one response
// ABOUTME: Routes initialize, tools, resources, prompts, and ping; enforces the monthly quota on tools/call
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Protocol Handler
//!
//! Interprets decoded JSON-RPC messages for an already authenticated caller.
//! Transport concerns (HTTP status, framing, sessions) live in `routes`.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::{next_monthly_reset, AuthContext};
use crate::constants::errors::{
    ERROR_INVALID_PARAMS, ERROR_METHOD_NOT_FOUND, ERROR_RATE_LIMIT_EXCEEDED,
};
use crate::constants::protocol::{MCP_PROTOCOL_VERSION, SERVER_NAME};
use crate::constants::SERVER_VERSION;
use crate::errors::AuthFailure;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::store::DataStore;
use crate::tools::{ToolContext, ToolRegistry};

use super::schema::{InitializeResponse, ListCapability, ServerCapabilities, ServerInfo};

/// Stateless MCP method router
#[derive(Clone)]
pub struct ProtocolHandler {
    tools: Arc<ToolRegistry>,
    store: Arc<dyn DataStore>,
    upgrade_url: String,
}

impl ProtocolHandler {
    /// Create a handler over the tool registry
    #[must_use]
    pub fn new(tools: Arc<ToolRegistry>, store: Arc<dyn DataStore>, upgrade_url: String) -> Self {
        Self {
            tools,
            store,
            upgrade_url,
        }
    }

    /// Validate and handle one raw message
    ///
    /// Returns `None` for well-formed notifications. Malformed messages
    /// always yield a `-32600` response; its `id` is `None` when the message
    /// carried none.
    pub async fn handle_value(&self, message: Value, auth: &AuthContext) -> Option<JsonRpcResponse> {
        match JsonRpcRequest::from_value(message) {
            Ok(request) => self.handle(request, auth).await,
            Err(formation_error) => {
                debug!("Rejected malformed JSON-RPC message");
                Some(formation_error)
            }
        }
    }

    /// Handle a batch; elements run concurrently and answers keep input order
    ///
    /// Only messages that carried an `id` contribute an entry. When nothing
    /// else answers, id-less formation errors are returned so a batch of
    /// malformed messages is never met with silence.
    pub async fn handle_batch(&self, messages: Vec<Value>, auth: &AuthContext) -> Vec<JsonRpcResponse> {
        let (answered, unaddressed): (Vec<_>, Vec<_>) =
            join_all(messages.into_iter().map(|m| self.handle_value(m, auth)))
                .await
                .into_iter()
                .flatten()
                .partition(|response| response.id.is_some());

        if answered.is_empty() {
            unaddressed
        } else {
            answered
        }
    }

    /// Handle one well-formed message
    pub async fn handle(&self, request: JsonRpcRequest, auth: &AuthContext) -> Option<JsonRpcResponse> {
        let start = Instant::now();
        let is_notification = request.is_notification();
        let method = request.method.clone();

        let response = self.route(request, auth).await;

        debug!(
            mcp.method = %method,
            tenant.id = %auth.tenant_id,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Processed MCP message"
        );

        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    async fn route(&self, request: JsonRpcRequest, auth: &AuthContext) -> JsonRpcResponse {
        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => Self::handle_initialize(id),
            "initialized" | "notifications/initialized" | "ping" => {
                JsonRpcResponse::success(id, json!({}))
            }
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": self.tools.list_tools() })),
            "tools/call" => self.handle_tools_call(request, auth).await,
            "resources/list" => JsonRpcResponse::success(id, json!({ "resources": [] })),
            "prompts/list" => JsonRpcResponse::success(id, json!({ "prompts": [] })),
            method @ ("resources/read" | "prompts/get") => JsonRpcResponse::error(
                id,
                ERROR_METHOD_NOT_FOUND,
                format!("Method not implemented: {method}"),
            ),
            method => {
                warn!(mcp.method = %method, "Unknown MCP method");
                JsonRpcResponse::error(
                    id,
                    ERROR_METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                )
            }
        }
    }

    fn handle_initialize(id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResponse {
            protocol_version: MCP_PROTOCOL_VERSION.to_owned(),
            capabilities: ServerCapabilities {
                tools: ListCapability {
                    list_changed: false,
                },
                resources: ListCapability {
                    list_changed: false,
                },
                prompts: ListCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: SERVER_VERSION.to_owned(),
            },
        };
        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(
                id,
                crate::constants::errors::ERROR_INTERNAL_ERROR,
                format!("Internal error: {e}"),
            ),
        }
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest, auth: &AuthContext) -> JsonRpcResponse {
        let JsonRpcRequest { id, params, .. } = request;

        let Some(name) = params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
        else {
            return JsonRpcResponse::error(
                id,
                ERROR_INVALID_PARAMS,
                "Invalid params: tools/call requires a tool name",
            );
        };

        if auth.quota_exhausted() {
            info!(
                tenant.id = %auth.tenant_id,
                mcp.tool = %name,
                "Monthly quota exhausted"
            );
            return self.rate_limit_error(id, auth);
        }

        let arguments = params
            .and_then(|mut p| p.get_mut("arguments").map(Value::take))
            .filter(|a| !a.is_null())
            .unwrap_or_else(|| json!({}));

        let ctx = ToolContext::new(auth.clone(), Arc::clone(&self.store));
        let outcome = self.tools.invoke(&name, arguments, &ctx).await;

        match serde_json::to_value(outcome.into_response()) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(
                id,
                crate::constants::errors::ERROR_INTERNAL_ERROR,
                format!("Internal error: {e}"),
            ),
        }
    }

    fn rate_limit_error(&self, id: Option<Value>, auth: &AuthContext) -> JsonRpcResponse {
        let entry = AuthFailure::RateLimit.entry();
        let reset = next_monthly_reset(Utc::now().date_naive());
        JsonRpcResponse::error_with_data(
            id,
            ERROR_RATE_LIMIT_EXCEEDED,
            entry.message,
            json!({
                "error": entry.tag,
                "hint": entry.hint,
                "resetDate": reset.format("%Y-%m-%d").to_string(),
                "upgradeUrl": self.upgrade_url,
                "tier": auth.tier,
                "monthlyLimit": auth.monthly_limit,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::errors::ERROR_INVALID_REQUEST;
    use crate::test_utils::{test_auth_context, MockDataStore, RecordingUsageSink};
    use crate::usage::UsageMeter;

    fn handler(store: Arc<MockDataStore>) -> ProtocolHandler {
        let tools = Arc::new(ToolRegistry::with_builtin_tools(UsageMeter::new(Arc::new(
            RecordingUsageSink::default(),
        ))));
        ProtocolHandler::new(tools, store, "https://app.example.com/billing".into())
    }

    fn call(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::with_id(method, params, json!(id))
    }

    #[tokio::test]
    async fn test_initialize_descriptor() {
        let ctx = test_auth_context("b1");
        let response = handler(Arc::new(MockDataStore::new()))
            .handle(call(1, "initialize", None), &ctx)
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_answer() {
        let ctx = test_auth_context("b1");
        let handler = handler(Arc::new(MockDataStore::new()));
        let response = handler
            .handle(JsonRpcRequest::notification("notifications/initialized", None), &ctx)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unknown_and_unimplemented_methods() {
        let ctx = test_auth_context("b1");
        let handler = handler(Arc::new(MockDataStore::new()));

        let unknown = handler.handle(call(2, "foo/bar", None), &ctx).await.unwrap();
        let error = unknown.error.unwrap();
        assert_eq!(error.code, ERROR_METHOD_NOT_FOUND);
        assert!(error.message.contains("foo/bar"));

        let read = handler.handle(call(3, "resources/read", None), &ctx).await.unwrap();
        assert_eq!(read.error.unwrap().code, ERROR_METHOD_NOT_FOUND);

        let list = handler.handle(call(4, "prompts/list", None), &ctx).await.unwrap();
        assert_eq!(list.result.unwrap(), json!({"prompts": []}));
    }

    #[tokio::test]
    async fn test_tools_call_requires_name() {
        let ctx = test_auth_context("b1");
        let response = handler(Arc::new(MockDataStore::new()))
            .handle(call(5, "tools/call", Some(json!({"arguments": {}}))), &ctx)
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, ERROR_INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_exhausted_quota_blocks_before_store() {
        let store = Arc::new(MockDataStore::new());
        let mut ctx = test_auth_context("b1");
        ctx.remaining_calls = Some(0);

        let response = handler(store.clone())
            .handle(
                call(6, "tools/call", Some(json!({"name": "list_services"}))),
                &ctx,
            )
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, ERROR_RATE_LIMIT_EXCEEDED);
        let data = error.data.unwrap();
        assert!(data["resetDate"].as_str().unwrap().ends_with("-01"));
        assert_eq!(data["upgradeUrl"], "https://app.example.com/billing");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tool_failure_is_success_envelope() {
        let ctx = test_auth_context("b1");
        let response = handler(Arc::new(MockDataStore::new()))
            .handle(
                call(7, "tools/call", Some(json!({"name": "get_customer", "arguments": {"customer_id": "x"}}))),
                &ctx,
            )
            .await
            .unwrap();
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            r#"{"error":"Customer not found"}"#
        );
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_skips_notifications() {
        let ctx = test_auth_context("b1");
        let responses = handler(Arc::new(MockDataStore::new()))
            .handle_batch(
                vec![
                    json!({"jsonrpc": "2.0", "id": "a", "method": "ping"}),
                    json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                    json!({"jsonrpc": "1.0", "id": "b", "method": "ping"}),
                    json!({"jsonrpc": "2.0", "method": ""}),
                    json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}),
                ],
                &ctx,
            )
            .await;
        let ids: Vec<Value> = responses.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!(3)]);
        assert!(responses[1].is_error());
    }

    #[tokio::test]
    async fn test_batch_of_only_malformed_messages_is_answered() {
        let ctx = test_auth_context("b1");
        let responses = handler(Arc::new(MockDataStore::new()))
            .handle_batch(
                vec![
                    json!(1),
                    json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                    json!({"jsonrpc": "2.0", "id": {"a": 1}, "method": "ping"}),
                ],
                &ctx,
            )
            .await;
        assert_eq!(responses.len(), 2);
        for response in responses {
            assert_eq!(response.id, None);
            assert_eq!(response.error.unwrap().code, ERROR_INVALID_REQUEST);
        }
    }
}
