// ABOUTME: Main library entry point for the multi-tenant CRM MCP gateway
// ABOUTME: Exposes CRM tools to AI agents as JSON-RPC over HTTP, keyed per brand
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

#![deny(unsafe_code)]

//! # CRM MCP Gateway
//!
//! A Model Context Protocol (MCP) gateway exposing a multi-tenant CRM
//! (customers, case files and services) to AI agents. Every request carries
//! an API key that resolves to one tenant ("brand"); every data store query
//! the tools issue is scoped to that tenant.
//!
//! ## Transports
//!
//! - **Streamable HTTP**: `POST /mcp` (single or batch), `GET /mcp` session
//!   stream, `DELETE /mcp`
//! - **Legacy SSE**: `GET /sse` announces `POST /messages`
//! - **Plain JSON**: `POST /mcp` or `/messages` without an event-stream `Accept`
//!
//! ## Architecture
//!
//! - **auth**: API key extraction and validation through the data store
//! - **mcp**: protocol handler and shared resources
//! - **tools**: tool registry, dispatcher and the CRM tool catalogue
//! - **store**: typed query description and the REST data store client
//! - **usage**: fire-and-forget usage metering
//! - **routes**: HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crm_mcp_server::config::ServerConfig;
//! use crm_mcp_server::mcp::ServerResources;
//! use crm_mcp_server::server::McpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::new(config)?);
//!     McpServer::new(resources).run().await
//! }
//! ```

/// API key authentication
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Gateway constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// JSON-RPC 2.0 envelope types
pub mod jsonrpc;

/// Structured logging setup
pub mod logging;

/// MCP protocol layer
pub mod mcp;

/// HTTP middleware
pub mod middleware;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Server-Sent Events streams
pub mod sse;

/// Data store access
pub mod store;

/// Test doubles and fixtures
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

/// Tool registry and CRM tools
pub mod tools;

/// Usage metering
pub mod usage;
