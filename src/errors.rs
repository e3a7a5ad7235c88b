// ABOUTME: Re-exports the unified error types from the core crate
// ABOUTME: Keeps `crate::errors::AppError` as the single import path inside the gateway
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Unified Error Handling System
//!
//! Canonical definitions live in `crm_core::errors`; this module re-exports
//! them so gateway code does not depend on the crate split.

pub use crm_core::errors::{AppError, AppResult, AuthFailure, AuthFailureEntry, ErrorCode};
