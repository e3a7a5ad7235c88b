// ABOUTME: Tool subsystem: trait, execution context, outcomes, registry, and CRM implementations
// ABOUTME: The registry is the only dispatch path from the protocol layer to tool code
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Tools
//!
//! - [`traits::McpTool`] - the interface each tool implements
//! - [`context::ToolContext`] - caller identity and data store handle
//! - [`result::ToolOutcome`] - normalized success/failure of one call
//! - [`registry::ToolRegistry`] - immutable catalogue with validated, metered dispatch
//! - [`implementations`] - customers, expedientes, and services

/// Per-invocation context
pub mod context;
/// Built-in CRM tools
pub mod implementations;
/// Tool registry
pub mod registry;
/// Tool outcome types
pub mod result;
/// Tool trait
pub mod traits;

pub use context::ToolContext;
pub use registry::ToolRegistry;
pub use result::ToolOutcome;
pub use traits::McpTool;
