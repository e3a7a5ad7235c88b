// ABOUTME: Gateway-wide constants for headers, endpoint paths, defaults, and data store names
// ABOUTME: Protocol-level constants are re-exported from the core crate
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

pub use crm_core::constants::errors;
pub use crm_core::constants::protocol;

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP header names
pub mod headers {
    /// Preferred API key header
    pub const API_KEY: &str = "x-api-key";
    /// Streamable HTTP session label
    pub const MCP_SESSION_ID: &str = "mcp-session-id";
    /// Bearer scheme prefix for the `Authorization` fallback
    pub const BEARER_PREFIX: &str = "Bearer ";
    /// Event stream media type
    pub const EVENT_STREAM: &str = "text/event-stream";
}

/// Endpoint paths served by the gateway
pub mod paths {
    /// Root liveness
    pub const ROOT: &str = "/";
    /// Liveness
    pub const HEALTH: &str = "/health";
    /// Streamable HTTP endpoint
    pub const MCP: &str = "/mcp";
    /// Legacy POST channel
    pub const MESSAGES: &str = "/messages";
    /// Legacy SSE bootstrap
    pub const SSE: &str = "/sse";
    /// OAuth protected resource metadata
    pub const OAUTH_PROTECTED_RESOURCE: &str = "/.well-known/oauth-protected-resource";
    /// OAuth authorization server metadata
    pub const OAUTH_AUTHORIZATION_SERVER: &str = "/.well-known/oauth-authorization-server";
    /// Dynamic client registration
    pub const REGISTER: &str = "/register";
}

/// Default configuration values
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8080;
    /// Bind address
    pub const HOST: &str = "0.0.0.0";
    /// Literal prefix carried by every tenant API key
    pub const API_KEY_PREFIX: &str = "crm_";
    /// Stored procedure that validates API keys
    pub const API_KEY_VALIDATION_RPC: &str = "validate_api_key";
    /// Table receiving one row per tool invocation
    pub const USAGE_LOG_TABLE: &str = "api_usage_logs";
    /// Outbound request timeout
    pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 30;
    /// Outbound connect timeout
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Keep-alive comment cadence on streams
    pub const SSE_KEEPALIVE_INTERVAL_SECS: u64 = 15;
    /// Wall-clock ceiling for one stream
    pub const SSE_MAX_STREAM_DURATION_SECS: u64 = 300;
    /// Documentation pointer included in auth error hints
    pub const DOCS_URL: &str = "https://docs.example.com/mcp";
    /// Upgrade pointer included in rate-limit errors
    pub const UPGRADE_URL: &str = "https://app.example.com/billing";
}

/// Data store tables used by the tool catalogue
pub mod tables {
    /// Customer records
    pub const CUSTOMERS: &str = "customers";
    /// Case files ("expedientes") attached to customers
    pub const EXPEDIENTES: &str = "expedientes";
    /// Service catalogue per brand
    pub const SERVICES: &str = "services";
    /// Tenant scoping column present on every table
    pub const TENANT_COLUMN: &str = "brand_id";
}

/// Service names for structured logging
pub mod service_names {
    /// Default service name
    pub const CRM_MCP_SERVER: &str = "crm-mcp-server";
}
