// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Layers applied to the whole router by the server
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

pub mod cors;
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{request_id, request_tracing, RequestSpan};
