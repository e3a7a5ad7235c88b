// ABOUTME: Central registry for MCP tools with validated, metered dispatch
// ABOUTME: Built once at startup; routes calls by name and normalizes every result into a ToolOutcome
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Tool Registry
//!
//! Central registry for MCP tools, providing:
//! - Tool registration and lookup
//! - Schema listing for `tools/list` responses
//! - Argument validation against each tool's declared schema
//! - Usage metering of every invocation
//!
//! The registry is built once at startup and shared immutably behind an
//! `Arc`; nothing is registered after the server starts serving.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::logging::AppLogger;
use crate::mcp::schema::ToolSchema;
use crate::usage::{UsageEvent, UsageMeter};

use super::context::ToolContext;
use super::implementations;
use super::result::ToolOutcome;
use super::traits::McpTool;

/// Immutable name → tool mapping with metered dispatch
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn McpTool>>,
    /// Registration order, used for listing
    order: Vec<String>,
    meter: UsageMeter,
}

impl ToolRegistry {
    /// Create an empty registry reporting to `meter`
    #[must_use]
    pub fn new(meter: UsageMeter) -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            meter,
        }
    }

    /// Create a registry holding the full CRM tool catalogue
    #[must_use]
    pub fn with_builtin_tools(meter: UsageMeter) -> Self {
        let mut registry = Self::new(meter);
        for tool in implementations::builtin_tools() {
            registry.register(tool);
        }
        debug!("Registered {} tools", registry.len());
        registry
    }

    /// Register a tool
    ///
    /// # Returns
    ///
    /// `true` if the tool was registered, `false` if a tool with the same name exists
    pub fn register(&mut self, tool: Arc<dyn McpTool>) -> bool {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            warn!("Tool '{}' is already registered, skipping", name);
            return false;
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        true
    }

    /// Descriptors of every tool, in registration order
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.schema())
            .collect()
    }

    /// Names of every tool, in registration order
    #[must_use]
    pub fn tool_names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    ///
    /// Never fails: unknown names, invalid arguments, and executor errors all
    /// become [`ToolOutcome::Failure`]. One usage event is emitted per call.
    pub async fn invoke(&self, name: &str, args: Value, ctx: &ToolContext) -> ToolOutcome {
        let start = Instant::now();
        let outcome = self.dispatch(name, args, ctx).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        AppLogger::log_mcp_tool_call(ctx.tenant_id(), name, outcome.is_success(), duration_ms);

        // Detached; the handle is intentionally dropped
        drop(self.meter.record(UsageEvent {
            api_key_id: ctx.auth.api_key_id.clone(),
            tenant_id: ctx.auth.tenant_id.clone(),
            tool_name: name.to_owned(),
            caller_user_id: ctx.auth.caller_user_id.clone(),
            success: outcome.is_success(),
            duration_ms,
            error_message: outcome.error_message().map(str::to_owned),
        }));

        outcome
    }

    async fn dispatch(&self, name: &str, args: Value, ctx: &ToolContext) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            return ToolOutcome::failed(format!(
                "Unknown tool: {name}. Available tools: {}",
                self.order.join(", ")
            ));
        };

        if let Err(problem) = tool.input_schema().validate(&args) {
            return ToolOutcome::failed(format!("Invalid input: {problem}"));
        }

        match tool.execute(args, ctx).await {
            Ok(data) => ToolOutcome::ok(data),
            Err(e) if e.is_validation() => ToolOutcome::failed(format!("Invalid input: {}", e.message)),
            Err(e) => {
                debug!(mcp.tool = %name, "Tool execution failed: {e}");
                ToolOutcome::failed(e.message)
            }
        }
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, AppResult};
    use crate::mcp::schema::{JsonSchema, PropertySchema};
    use crate::test_utils::{test_auth_context, MockDataStore, RecordingUsageSink};
    use async_trait::async_trait;
    use serde_json::json;

    struct Greet;

    #[async_trait]
    impl McpTool for Greet {
        fn name(&self) -> &'static str {
            "greet"
        }

        fn description(&self) -> &'static str {
            "Say hello"
        }

        fn input_schema(&self) -> JsonSchema {
            JsonSchema::object(vec![("who", PropertySchema::string("Name"))], &["who"])
        }

        async fn execute(&self, args: Value, _ctx: &ToolContext) -> AppResult<Value> {
            match args["who"].as_str() {
                Some("nobody") => Err(AppError::not_found("Person")),
                Some(who) => Ok(json!({ "greeting": format!("hello {who}") })),
                None => Err(AppError::missing_field("who")),
            }
        }
    }

    fn registry(sink: Arc<RecordingUsageSink>) -> ToolRegistry {
        let mut registry = ToolRegistry::new(UsageMeter::new(sink));
        assert!(registry.register(Arc::new(Greet)));
        assert!(!registry.register(Arc::new(Greet)));
        registry
    }

    fn ctx() -> ToolContext {
        ToolContext::new(test_auth_context("brand-1"), Arc::new(MockDataStore::new()))
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_available_tools() {
        let registry = registry(Arc::new(RecordingUsageSink::default()));
        let outcome = registry.invoke("nope", json!({}), &ctx()).await;
        assert_eq!(
            outcome.error_message(),
            Some("Unknown tool: nope. Available tools: greet")
        );
    }

    #[tokio::test]
    async fn test_schema_failure_is_invalid_input() {
        let registry = registry(Arc::new(RecordingUsageSink::default()));
        let outcome = registry.invoke("greet", json!({}), &ctx()).await;
        assert_eq!(
            outcome.error_message(),
            Some("Invalid input: missing required field who")
        );
    }

    #[tokio::test]
    async fn test_executor_error_is_converted() {
        let registry = registry(Arc::new(RecordingUsageSink::default()));
        let outcome = registry
            .invoke("greet", json!({"who": "nobody"}), &ctx())
            .await;
        assert_eq!(outcome.error_message(), Some("Person not found"));
    }

    #[tokio::test]
    async fn test_every_invocation_is_metered() {
        let sink = Arc::new(RecordingUsageSink::default());
        let registry = registry(sink.clone());
        let ok = registry.invoke("greet", json!({"who": "ana"}), &ctx()).await;
        assert!(ok.is_success());
        registry.invoke("missing", json!({}), &ctx()).await;

        let events = sink.wait_for(2).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.tool_name == "greet" && e.success));
        assert!(events.iter().any(|e| e.tool_name == "missing" && !e.success));
        assert!(events.iter().all(|e| e.tenant_id == "brand-1"));
    }

    #[tokio::test]
    async fn test_metering_failure_does_not_change_outcome() {
        let registry = registry(Arc::new(RecordingUsageSink::failing()));
        let outcome = registry.invoke("greet", json!({"who": "ana"}), &ctx()).await;
        assert_eq!(outcome, ToolOutcome::ok(json!({"greeting": "hello ana"})));
    }

    #[test]
    fn test_builtin_catalogue_is_complete() {
        let registry =
            ToolRegistry::with_builtin_tools(UsageMeter::new(Arc::new(RecordingUsageSink::default())));
        let names: Vec<&str> = registry.tool_names().iter().map(String::as_str).collect();
        assert_eq!(
            names,
            [
                "search_customers",
                "get_customer",
                "create_customer",
                "update_customer",
                "list_expedientes",
                "get_expediente",
                "create_expediente",
                "update_expediente_status",
                "list_services",
            ]
        );
        assert_eq!(registry.list_tools(), registry.list_tools());
    }
}
