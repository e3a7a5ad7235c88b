// ABOUTME: Legacy two-channel SSE bootstrap endpoint
// ABOUTME: Authenticates, then streams an endpoint event pointing at the POST channel plus keep-alives
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::info;

use crate::constants::paths;
use crate::mcp::resources::ServerResources;
use crate::sse;

use super::mcp::authenticate;

/// Legacy SSE routes
pub struct SseRoutes;

impl SseRoutes {
    /// Create the `/sse` bootstrap route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::SSE, get(Self::handle_sse))
            .with_state(resources)
    }

    async fn handle_sse(
        State(resources): State<Arc<ServerResources>>,
        request_headers: HeaderMap,
    ) -> Response {
        let auth = match authenticate(&resources, &request_headers).await {
            Ok(auth) => auth,
            Err(rejection) => return rejection.into_response(),
        };

        let session_id = sse::new_session_id();
        info!(
            session.id = %session_id,
            tenant.id = %auth.tenant_id,
            "Opened legacy SSE session"
        );

        let preamble = vec![sse::endpoint_event(paths::MESSAGES, &session_id)];
        sse::into_sse(sse::session_stream(
            session_id,
            &resources.config.sse,
            preamble,
        ))
        .into_response()
    }
}
