// ABOUTME: Configuration module for gateway settings loaded at startup
// ABOUTME: Re-exports the environment-driven ServerConfig and its typed sections
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! Configuration for the CRM MCP gateway
//!
//! Everything is read from environment variables once, at startup, into an
//! immutable [`ServerConfig`] that is then shared through the server
//! resources.

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DataStoreConfig, Environment, HttpClientConfig, ServerConfig,
    SseConfig,
};
