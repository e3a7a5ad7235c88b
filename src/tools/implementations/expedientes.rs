// ABOUTME: Expediente (case file) tools for listing, reading, opening, and moving case files
// ABOUTME: Implements list_expedientes, get_expediente, create_expediente, update_expediente_status
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::constants::tables::{CUSTOMERS, EXPEDIENTES, SERVICES, TENANT_COLUMN};
use crate::errors::{AppError, AppResult};
use crate::mcp::schema::{JsonSchema, PropertySchema};
use crate::tools::context::ToolContext;
use crate::tools::traits::McpTool;

use super::{
    copy_fields, first_or_not_found, limit_arg, listing, optional_str, required_str,
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};

/// Lifecycle states of an expediente
pub const EXPEDIENTE_STATUSES: [&str; 5] = ["open", "in_progress", "pending", "closed", "cancelled"];

/// State of a newly opened expediente
const INITIAL_STATUS: &str = "open";

/// Fail with not-found unless `id` names a row of `table` in the caller's tenant
async fn ensure_owned(ctx: &ToolContext, table: &str, id: &str, resource: &str) -> AppResult<()> {
    let rows = ctx
        .store
        .select(ctx.scoped(table).columns("id").eq("id", id).limit(1))
        .await?;
    first_or_not_found(rows, resource).map(|_| ())
}

// ============================================================================
// ListExpedientesTool
// ============================================================================

/// List expedientes, optionally by customer or status
pub struct ListExpedientesTool;

#[async_trait]
impl McpTool for ListExpedientesTool {
    fn name(&self) -> &'static str {
        "list_expedientes"
    }

    fn description(&self) -> &'static str {
        "List case files (expedientes), newest first. Filter by customer or status."
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![
                ("customer_id", PropertySchema::string("Only this customer's expedientes")),
                (
                    "status",
                    PropertySchema::one_of("Only expedientes in this status", &EXPEDIENTE_STATUSES),
                ),
                (
                    "limit",
                    PropertySchema::integer("Maximum number of expedientes to return")
                        .range(1, MAX_LIST_LIMIT as i64)
                        .with_default(json!(DEFAULT_LIST_LIMIT)),
                ),
            ],
            &[],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let mut query = ctx
            .scoped(EXPEDIENTES)
            .order_by("created_at", true)
            .limit(limit_arg(&args));
        if let Some(customer_id) = optional_str(&args, "customer_id") {
            query = query.eq("customer_id", customer_id);
        }
        if let Some(status) = optional_str(&args, "status") {
            query = query.eq("status", status);
        }

        let rows = ctx.store.select(query).await?;
        Ok(listing("expedientes", rows))
    }
}

// ============================================================================
// GetExpedienteTool
// ============================================================================

/// Fetch one expediente by id
pub struct GetExpedienteTool;

#[async_trait]
impl McpTool for GetExpedienteTool {
    fn name(&self) -> &'static str {
        "get_expediente"
    }

    fn description(&self) -> &'static str {
        "Get a case file (expediente) by id"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![("expediente_id", PropertySchema::string("Expediente id"))],
            &["expediente_id"],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let id = required_str(&args, "expediente_id")?;
        let rows = ctx
            .store
            .select(ctx.scoped(EXPEDIENTES).eq("id", id).limit(1))
            .await?;
        first_or_not_found(rows, "Expediente")
    }
}

// ============================================================================
// CreateExpedienteTool
// ============================================================================

/// Open an expediente for a customer of the caller's tenant
pub struct CreateExpedienteTool;

#[async_trait]
impl McpTool for CreateExpedienteTool {
    fn name(&self) -> &'static str {
        "create_expediente"
    }

    fn description(&self) -> &'static str {
        "Open a new case file (expediente) for a customer, optionally linked to a service"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![
                ("customer_id", PropertySchema::string("Customer the expediente belongs to")),
                ("title", PropertySchema::string("Short title")),
                ("description", PropertySchema::string("Detailed description")),
                ("service_id", PropertySchema::string("Service being provided")),
            ],
            &["customer_id", "title"],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let customer_id = required_str(&args, "customer_id")?;
        let title = required_str(&args, "title")?;

        ensure_owned(ctx, CUSTOMERS, customer_id, "Customer").await?;
        if let Some(service_id) = optional_str(&args, "service_id") {
            ensure_owned(ctx, SERVICES, service_id, "Service").await?;
        }

        let mut row = Map::new();
        row.insert(TENANT_COLUMN.to_owned(), json!(ctx.tenant_id()));
        row.insert("customer_id".to_owned(), json!(customer_id));
        row.insert("title".to_owned(), json!(title));
        row.insert("status".to_owned(), json!(INITIAL_STATUS));
        row.insert("created_by".to_owned(), json!(ctx.auth.caller_user_id));
        copy_fields(&args, &["description", "service_id"], &mut row);

        ctx.store
            .insert(EXPEDIENTES, Value::Object(row))
            .await?
            .ok_or_else(|| AppError::internal("Expediente insert returned no row"))
    }
}

// ============================================================================
// UpdateExpedienteStatusTool
// ============================================================================

/// Move an expediente to another status
pub struct UpdateExpedienteStatusTool;

#[async_trait]
impl McpTool for UpdateExpedienteStatusTool {
    fn name(&self) -> &'static str {
        "update_expediente_status"
    }

    fn description(&self) -> &'static str {
        "Change the status of a case file (expediente)"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![
                ("expediente_id", PropertySchema::string("Expediente id")),
                ("status", PropertySchema::one_of("New status", &EXPEDIENTE_STATUSES)),
            ],
            &["expediente_id", "status"],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let id = required_str(&args, "expediente_id")?;
        let status = required_str(&args, "status")?;

        let rows = ctx
            .store
            .update(
                ctx.scoped(EXPEDIENTES).eq("id", id),
                json!({ "status": status, "updated_at": Utc::now().to_rfc3339() }),
            )
            .await?;
        first_or_not_found(rows, "Expediente")
    }
}
