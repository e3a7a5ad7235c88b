// ABOUTME: CORS middleware configuration for the gateway's HTTP endpoints
// ABOUTME: Answers preflights without authentication and exposes the MCP session header
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::constants::headers;

/// Configure CORS for the MCP endpoints
///
/// `CORS_ALLOWED_ORIGINS="*"` (the default) allows any origin and any
/// request header; a comma-separated list restricts origins.
///
/// ```bash
/// # Allow specific origins
/// export CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
/// ```
pub fn setup_cors(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers(AllowHeaders::any())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .expose_headers([HeaderName::from_static(headers::MCP_SESSION_ID)])
}
