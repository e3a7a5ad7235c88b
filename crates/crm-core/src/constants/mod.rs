// ABOUTME: Constants shared between the core crate and the gateway
// ABOUTME: Groups JSON-RPC protocol values and reserved error codes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! Constants module

/// JSON-RPC and MCP protocol identification
pub mod protocol;

/// JSON-RPC error codes (standard and reserved server block)
pub mod errors;

pub use protocol::*;
