// ABOUTME: Service catalogue tool listing the services a tenant offers
// ABOUTME: Implements list_services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::constants::tables::SERVICES;
use crate::errors::AppResult;
use crate::mcp::schema::{JsonSchema, PropertySchema};
use crate::tools::context::ToolContext;
use crate::tools::traits::McpTool;

use super::listing;

/// List the tenant's services
pub struct ListServicesTool;

#[async_trait]
impl McpTool for ListServicesTool {
    fn name(&self) -> &'static str {
        "list_services"
    }

    fn description(&self) -> &'static str {
        "List the services offered, ordered by name"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![(
                "active_only",
                PropertySchema::boolean("Only include active services")
                    .with_default(json!(true)),
            )],
            &[],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let active_only = args
            .get("active_only")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let mut query = ctx.scoped(SERVICES).order_by("name", false);
        if active_only {
            query = query.eq("is_active", "true");
        }

        let rows = ctx.store.select(query).await?;
        Ok(listing("services", rows))
    }
}
