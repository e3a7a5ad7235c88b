// ABOUTME: HTTP server assembling routes and middleware and serving until shutdown
// ABOUTME: Binds the configured address and drains in-flight requests on SIGINT or SIGTERM
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

use crate::mcp::resources::ServerResources;
use crate::middleware::{request_tracing, setup_cors};
use crate::routes;

/// The gateway HTTP server
pub struct McpServer {
    resources: Arc<ServerResources>,
}

impl McpServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Complete router with CORS and tracing layers
    #[must_use]
    pub fn router(&self) -> Router {
        routes::router(Arc::clone(&self.resources))
            .layer(setup_cors(&self.resources.config.cors))
            .layer(request_tracing())
    }

    /// Bind and serve until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed or bound, or the
    /// server fails while running
    pub async fn run(self) -> anyhow::Result<()> {
        let config = &self.resources.config;
        let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", config.host, config.http_port))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        info!(addr = %addr, tools = self.resources.tools.len(), "CRM MCP gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        info!("CRM MCP gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
