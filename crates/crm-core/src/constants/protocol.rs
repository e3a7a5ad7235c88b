// ABOUTME: MCP protocol constants for version and server identification
// ABOUTME: Pure compile-time constants without runtime configuration dependencies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

/// JSON-RPC version (standard, not configurable)
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised by `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised by `initialize` and health endpoints
pub const SERVER_NAME: &str = "crm-mcp-server";
