// ABOUTME: Module containing the CRM tool implementations organized by entity
// ABOUTME: Also hosts the argument helpers shared by every tool
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Tool Implementations
//!
//! - `customers` - search, fetch, create, and update customer records
//! - `expedientes` - case files attached to customers
//! - `services` - the tenant's service catalogue
//!
//! Every query a tool issues is scoped to the caller's tenant through
//! [`ToolContext::scoped`](super::context::ToolContext::scoped).

/// Customer tools
pub mod customers;
/// Expediente (case file) tools
pub mod expedientes;
/// Service catalogue tools
pub mod services;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

use super::traits::McpTool;

/// Default row cap for list tools
pub const DEFAULT_LIST_LIMIT: usize = 20;
/// Largest row cap a caller may request
pub const MAX_LIST_LIMIT: usize = 100;

/// Every built-in tool, in listing order
#[must_use]
pub fn builtin_tools() -> Vec<Arc<dyn McpTool>> {
    vec![
        Arc::new(customers::SearchCustomersTool),
        Arc::new(customers::GetCustomerTool),
        Arc::new(customers::CreateCustomerTool),
        Arc::new(customers::UpdateCustomerTool),
        Arc::new(expedientes::ListExpedientesTool),
        Arc::new(expedientes::GetExpedienteTool),
        Arc::new(expedientes::CreateExpedienteTool),
        Arc::new(expedientes::UpdateExpedienteStatusTool),
        Arc::new(services::ListServicesTool),
    ]
}

/// Non-empty string argument
pub(crate) fn required_str<'a>(args: &'a Value, field: &str) -> AppResult<&'a str> {
    optional_str(args, field).ok_or_else(|| AppError::missing_field(field))
}

/// String argument, `None` when absent, null, or blank
pub(crate) fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Row cap argument clamped to `1..=MAX_LIST_LIMIT`
pub(crate) fn limit_arg(args: &Value) -> usize {
    args.get("limit")
        .and_then(Value::as_u64)
        .and_then(|l| usize::try_from(l).ok())
        .map_or(DEFAULT_LIST_LIMIT, |l| l.clamp(1, MAX_LIST_LIMIT))
}

/// Copy the present string arguments named in `fields` into a row
pub(crate) fn copy_fields(args: &Value, fields: &[&str], row: &mut Map<String, Value>) {
    for field in fields {
        if let Some(value) = optional_str(args, field) {
            row.insert((*field).to_owned(), Value::String(value.to_owned()));
        }
    }
}

/// First row, or a not-found error naming `resource`
pub(crate) fn first_or_not_found(rows: Vec<Value>, resource: &str) -> AppResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(resource))
}

/// List payload: `{ <key>: rows, count }`
pub(crate) fn listing(key: &str, rows: Vec<Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("count".to_owned(), Value::from(rows.len()));
    payload.insert(key.to_owned(), Value::Array(rows));
    Value::Object(payload)
}
