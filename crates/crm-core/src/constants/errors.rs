// ABOUTME: JSON-RPC error code constants used across protocol handling
// ABOUTME: Standard -32700..-32600 block plus the reserved server block for auth failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

/// Parse error - invalid JSON
pub const ERROR_PARSE: i32 = -32700;

/// Invalid Request - not a well-formed JSON-RPC message
pub const ERROR_INVALID_REQUEST: i32 = -32600;

/// Method not found (also used for methods that are not implemented)
pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;

/// Invalid params
pub const ERROR_INVALID_PARAMS: i32 = -32602;

/// Internal error
pub const ERROR_INTERNAL_ERROR: i32 = -32603;

/// No API key was supplied
pub const ERROR_AUTH_MISSING_KEY: i32 = -32001;

/// API key does not carry the required prefix
pub const ERROR_AUTH_INVALID_FORMAT: i32 = -32002;

/// API key is unknown to the validation service
pub const ERROR_AUTH_INVALID_KEY: i32 = -32003;

/// API key exists but was deactivated
pub const ERROR_AUTH_INACTIVE_KEY: i32 = -32004;

/// API key passed its expiry date
pub const ERROR_AUTH_EXPIRED_KEY: i32 = -32005;

/// Monthly call quota exhausted
pub const ERROR_RATE_LIMIT_EXCEEDED: i32 = -32006;

/// Server-side configuration prevents validation
pub const ERROR_SERVER_CONFIG: i32 = -32007;

/// Validation failed for an unexpected reason
pub const ERROR_AUTH_INTERNAL: i32 = -32008;
