// ABOUTME: Route module organization for the CRM MCP gateway HTTP endpoints
// ABOUTME: Combines liveness, MCP transports, legacy SSE, and OAuth shims behind one router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! Route module for the CRM MCP gateway
//!
//! Each domain module exposes a `XRoutes::routes` constructor; [`router`]
//! merges them and installs the 404 fallback with a directory of endpoints.

/// Health check routes
pub mod health;
/// Streamable HTTP and legacy POST routes
pub mod mcp;
/// OAuth discovery shims
pub mod oauth_discovery;
/// Legacy SSE bootstrap route
pub mod sse;

use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;

pub use health::HealthRoutes;
pub use mcp::McpRoutes;
pub use oauth_discovery::OAuthDiscoveryRoutes;
pub use sse::SseRoutes;

use crate::constants::paths;
use crate::mcp::resources::ServerResources;

/// Merge every route group and install the fallback
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(McpRoutes::routes(Arc::clone(&resources)))
        .merge(SseRoutes::routes(resources))
        .merge(OAuthDiscoveryRoutes::routes())
        .fallback(handle_not_found)
}

async fn handle_not_found(uri: Uri) -> Response {
    if oauth_discovery::is_oauth_path(uri.path()) {
        return oauth_discovery::not_supported().await;
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("No endpoint at {}", uri.path()),
            "endpoints": [
                { "path": paths::HEALTH, "methods": ["GET"], "description": "Liveness" },
                { "path": paths::MCP, "methods": ["GET", "POST", "DELETE"], "description": "Streamable HTTP MCP endpoint" },
                { "path": paths::MESSAGES, "methods": ["POST"], "description": "Legacy SSE POST channel" },
                { "path": paths::SSE, "methods": ["GET"], "description": "Legacy SSE session bootstrap" },
                { "path": paths::OAUTH_PROTECTED_RESOURCE, "methods": ["GET"], "description": "Protected resource metadata" },
            ],
        })),
    )
        .into_response()
}
