// ABOUTME: Defines the McpTool trait implemented by every CRM tool
// ABOUTME: Tools are registered once in the ToolRegistry and executed through it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # MCP Tool Trait
//!
//! All tools implement [`McpTool`], which provides metadata (name,
//! description, input schema) and async execution against a
//! [`ToolContext`].
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use crm_mcp_server::errors::AppResult;
//! use crm_mcp_server::mcp::schema::JsonSchema;
//! use crm_mcp_server::tools::{McpTool, ToolContext};
//! use serde_json::{json, Value};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl McpTool for Echo {
//!     fn name(&self) -> &'static str {
//!         "echo"
//!     }
//!
//!     fn description(&self) -> &'static str {
//!         "Return the arguments unchanged"
//!     }
//!
//!     fn input_schema(&self) -> JsonSchema {
//!         JsonSchema::object(vec![], &[])
//!     }
//!
//!     async fn execute(&self, args: Value, _ctx: &ToolContext) -> AppResult<Value> {
//!         Ok(json!({ "echo": args }))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppResult;
use crate::mcp::schema::{JsonSchema, ToolSchema};

use super::context::ToolContext;

/// The trait every invokable tool implements
///
/// Arguments reach `execute` only after they passed
/// [`JsonSchema::validate`] for `input_schema()`. Errors returned from
/// `execute` are converted into failed outcomes by the registry and never
/// reach the protocol layer as JSON-RPC errors.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &'static str;

    /// Human readable description
    fn description(&self) -> &'static str;

    /// Declared input schema
    fn input_schema(&self) -> JsonSchema;

    /// Run the tool
    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value>;

    /// Descriptor used by `tools/list`
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            input_schema: self.input_schema(),
        }
    }
}
