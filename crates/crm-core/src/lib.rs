// ABOUTME: Core types and constants for the multi-tenant CRM MCP gateway
// ABOUTME: Foundation crate with error handling, auth failure taxonomy, and protocol constants
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

#![deny(unsafe_code)]

//! # CRM Core
//!
//! Foundation crate providing shared types and constants for the CRM MCP
//! gateway. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and the
//!   closed `AuthFailure` taxonomy
//! - **constants**: Protocol and error-code constants

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;
