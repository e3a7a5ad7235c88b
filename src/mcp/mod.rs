// ABOUTME: Model Context Protocol layer: payload schemas, method routing, and shared resources
// ABOUTME: Transport-independent; the HTTP surface lives in the routes module
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

/// MCP method routing
pub mod protocol;
/// Dependency container shared by routes
pub mod resources;
/// MCP payload and tool schema types
pub mod schema;

pub use protocol::ProtocolHandler;
pub use resources::ServerResources;
