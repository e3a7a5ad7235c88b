// ABOUTME: OAuth discovery shims telling standards-following clients that OAuth is not used
// ABOUTME: Protected-resource metadata points at the x-api-key header; every other OAuth path is a 404
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # OAuth Discovery Shims
//!
//! MCP clients probe the OAuth discovery documents before connecting. The
//! gateway authenticates with API keys only, so it publishes protected
//! resource metadata with no authorization servers and answers the
//! authorization-server, registration and `/oauth*` paths with a 404.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;

use crate::constants::{headers, paths};

/// OAuth discovery routes
pub struct OAuthDiscoveryRoutes;

impl OAuthDiscoveryRoutes {
    /// Create the discovery routes
    ///
    /// `/oauth*` paths have no fixed shape and are caught by the router
    /// fallback through [`is_oauth_path`].
    pub fn routes() -> Router {
        Router::new()
            .route(
                paths::OAUTH_PROTECTED_RESOURCE,
                get(Self::handle_protected_resource),
            )
            .route(paths::OAUTH_AUTHORIZATION_SERVER, any(not_supported))
            .route(paths::REGISTER, any(not_supported))
    }

    async fn handle_protected_resource(request_headers: HeaderMap) -> Json<serde_json::Value> {
        let resource = request_headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map_or_else(
                || paths::MCP.to_owned(),
                |host| format!("http://{host}{}", paths::MCP),
            );

        Json(json!({
            "resource": resource,
            "authorization_servers": [],
            "bearer_methods_supported": ["header"],
            "oauth_required": false,
            "authentication": {
                "type": "api_key",
                "header": headers::API_KEY,
                "description": format!(
                    "Send your API key in the {} header. OAuth is not supported.",
                    headers::API_KEY
                ),
            },
        }))
    }
}

/// Whether `path` falls under the OAuth shim namespace
#[must_use]
pub fn is_oauth_path(path: &str) -> bool {
    path.starts_with("/oauth")
        || path.starts_with(paths::OAUTH_AUTHORIZATION_SERVER)
        || path.starts_with(paths::REGISTER)
}

/// 404 stating that OAuth is not supported
pub async fn not_supported() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "oauth_not_supported",
            "error_description": format!(
                "This server does not use OAuth. Authenticate with the {} header.",
                headers::API_KEY
            ),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_paths() {
        assert!(is_oauth_path("/oauth"));
        assert!(is_oauth_path("/oauth/authorize"));
        assert!(is_oauth_path("/oauth2/token"));
        assert!(is_oauth_path("/.well-known/oauth-authorization-server/mcp"));
        assert!(is_oauth_path("/register"));
        assert!(!is_oauth_path("/mcp"));
        assert!(!is_oauth_path("/health"));
    }
}
