// ABOUTME: Gateway binary loading configuration from the environment and serving HTTP
// ABOUTME: Supports a --http-port override on top of the environment settings
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # CRM MCP Gateway Binary
//!
//! Starts the multi-tenant CRM MCP gateway. Configuration comes from the
//! environment; see `ServerConfig::from_env`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use crm_mcp_server::{
    config::ServerConfig, logging, mcp::ServerResources, server::McpServer,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "crm-mcp-server")]
#[command(about = "Multi-tenant CRM MCP gateway - CRM tools for AI agents over JSON-RPC")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting CRM MCP gateway");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::new(config)?);

    if let Err(e) = McpServer::new(resources).run().await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
