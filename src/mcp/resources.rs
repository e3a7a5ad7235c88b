// ABOUTME: Shared server resources wired once at startup and injected into every route
// ABOUTME: Owns configuration, authenticator, tool registry, and protocol handler
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Server Resources
//!
//! Dependency container built once and shared behind an `Arc`. Nothing in it
//! is mutated after construction.

use std::sync::Arc;

use tracing::info;

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::store::{DataStore, RestDataStore};
use crate::tools::ToolRegistry;
use crate::usage::{StoreUsageSink, UsageMeter, UsageSink};

use super::protocol::ProtocolHandler;

/// Everything a request handler needs
pub struct ServerResources {
    /// Immutable configuration
    pub config: Arc<ServerConfig>,
    /// API key authenticator
    pub authenticator: Authenticator,
    /// Tool catalogue
    pub tools: Arc<ToolRegistry>,
    /// MCP method router
    pub protocol: ProtocolHandler,
}

impl ServerResources {
    /// Wire production resources: REST data store and store-backed metering
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: ServerConfig) -> AppResult<Self> {
        let store: Arc<dyn DataStore> =
            Arc::new(RestDataStore::new(&config.data_store, &config.http_client)?);
        let sink = Arc::new(StoreUsageSink::new(
            Arc::clone(&store),
            config.data_store.usage_log_table.clone(),
        ));
        Ok(Self::with_parts(config, store, sink))
    }

    /// Wire resources around caller-supplied store and usage sink
    #[must_use]
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn DataStore>,
        sink: Arc<dyn UsageSink>,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::with_builtin_tools(UsageMeter::new(sink)));
        info!("Tool registry ready with {} tools", tools.len());

        let authenticator = Authenticator::new(Arc::clone(&store), config.auth.clone());
        let protocol = ProtocolHandler::new(
            Arc::clone(&tools),
            store,
            config.auth.upgrade_url.clone(),
        );

        Self {
            config: Arc::new(config),
            authenticator,
            tools,
            protocol,
        }
    }
}
