// ABOUTME: Liveness endpoints answered with static JSON and no authentication
// ABOUTME: Serves `/` and `/health` with server name, version, and timestamp
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::constants::{paths, protocol::SERVER_NAME, SERVER_VERSION};

/// Health check routes
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the liveness routes
    pub fn routes() -> Router {
        Router::new()
            .route(paths::ROOT, get(Self::handle_health))
            .route(paths::HEALTH, get(Self::handle_health))
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "server": SERVER_NAME,
            "version": SERVER_VERSION,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }
}
