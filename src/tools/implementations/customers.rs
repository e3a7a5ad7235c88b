// ABOUTME: Customer tools for searching, reading, creating, and updating customer records
// ABOUTME: Implements search_customers, get_customer, create_customer, update_customer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::constants::tables::{CUSTOMERS, TENANT_COLUMN};
use crate::errors::{AppError, AppResult};
use crate::mcp::schema::{JsonSchema, PropertySchema};
use crate::store::Filter;
use crate::tools::context::ToolContext;
use crate::tools::traits::McpTool;

use super::{
    copy_fields, first_or_not_found, limit_arg, listing, optional_str, required_str,
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};

/// Optional descriptive customer columns
const CUSTOMER_FIELDS: [&str; 5] = ["email", "phone", "tax_id", "address", "notes"];

fn customer_properties() -> Vec<(&'static str, PropertySchema)> {
    vec![
        ("email", PropertySchema::string("Contact email")),
        ("phone", PropertySchema::string("Contact phone number")),
        ("tax_id", PropertySchema::string("Tax identification number")),
        ("address", PropertySchema::string("Postal address")),
        ("notes", PropertySchema::string("Free-form notes")),
    ]
}

// ============================================================================
// SearchCustomersTool
// ============================================================================

/// Search customers by name or email
pub struct SearchCustomersTool;

#[async_trait]
impl McpTool for SearchCustomersTool {
    fn name(&self) -> &'static str {
        "search_customers"
    }

    fn description(&self) -> &'static str {
        "Search customers by name or email. Returns the most recently created matches first."
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![
                (
                    "query",
                    PropertySchema::string("Text matched against name and email; omit to list all"),
                ),
                (
                    "limit",
                    PropertySchema::integer("Maximum number of customers to return")
                        .range(1, MAX_LIST_LIMIT as i64)
                        .with_default(json!(DEFAULT_LIST_LIMIT)),
                ),
            ],
            &[],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let mut query = ctx
            .scoped(CUSTOMERS)
            .order_by("created_at", true)
            .limit(limit_arg(&args));

        if let Some(text) = optional_str(&args, "query") {
            let pattern = format!("*{}*", text.replace('*', ""));
            query = query.filter(Filter::AnyOf(vec![
                Filter::ilike("name", pattern.clone()),
                Filter::ilike("email", pattern),
            ]));
        }

        let rows = ctx.store.select(query).await?;
        Ok(listing("customers", rows))
    }
}

// ============================================================================
// GetCustomerTool
// ============================================================================

/// Fetch one customer by id
pub struct GetCustomerTool;

#[async_trait]
impl McpTool for GetCustomerTool {
    fn name(&self) -> &'static str {
        "get_customer"
    }

    fn description(&self) -> &'static str {
        "Get a customer by id"
    }

    fn input_schema(&self) -> JsonSchema {
        JsonSchema::object(
            vec![("customer_id", PropertySchema::string("Customer id"))],
            &["customer_id"],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let id = required_str(&args, "customer_id")?;
        let rows = ctx
            .store
            .select(ctx.scoped(CUSTOMERS).eq("id", id).limit(1))
            .await?;
        first_or_not_found(rows, "Customer")
    }
}

// ============================================================================
// CreateCustomerTool
// ============================================================================

/// Create a customer in the caller's tenant
pub struct CreateCustomerTool;

#[async_trait]
impl McpTool for CreateCustomerTool {
    fn name(&self) -> &'static str {
        "create_customer"
    }

    fn description(&self) -> &'static str {
        "Create a new customer"
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = vec![("name", PropertySchema::string("Customer name"))];
        properties.extend(customer_properties());
        JsonSchema::object(properties, &["name"])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let mut row = Map::new();
        row.insert(TENANT_COLUMN.to_owned(), json!(ctx.tenant_id()));
        row.insert("name".to_owned(), json!(required_str(&args, "name")?));
        copy_fields(&args, &CUSTOMER_FIELDS, &mut row);

        ctx.store
            .insert(CUSTOMERS, Value::Object(row))
            .await?
            .ok_or_else(|| AppError::internal("Customer insert returned no row"))
    }
}

// ============================================================================
// UpdateCustomerTool
// ============================================================================

/// Patch a customer's descriptive fields
pub struct UpdateCustomerTool;

#[async_trait]
impl McpTool for UpdateCustomerTool {
    fn name(&self) -> &'static str {
        "update_customer"
    }

    fn description(&self) -> &'static str {
        "Update a customer's details. Only the provided fields change."
    }

    fn input_schema(&self) -> JsonSchema {
        let mut properties = vec![
            ("customer_id", PropertySchema::string("Customer id")),
            ("name", PropertySchema::string("Customer name")),
        ];
        properties.extend(customer_properties());
        JsonSchema::object(properties, &["customer_id"])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> AppResult<Value> {
        let id = required_str(&args, "customer_id")?;

        let mut patch = Map::new();
        copy_fields(&args, &["name"], &mut patch);
        copy_fields(&args, &CUSTOMER_FIELDS, &mut patch);
        if patch.is_empty() {
            return Err(AppError::invalid_input(
                "at least one field to update is required",
            ));
        }
        patch.insert("updated_at".to_owned(), json!(Utc::now().to_rfc3339()));

        let rows = ctx
            .store
            .update(ctx.scoped(CUSTOMERS).eq("id", id), Value::Object(patch))
            .await?;
        first_or_not_found(rows, "Customer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FilterOp, StoreRequest};
    use crate::test_utils::{test_tool_context, MockDataStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_search_is_scoped_and_ordered() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_select(CUSTOMERS, Ok(json!([{"id": "c1"}, {"id": "c2"}])));
        let ctx = test_tool_context("brand-1", store.clone());

        let result = SearchCustomersTool
            .execute(json!({"query": "ana", "limit": 5}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["count"], 2);

        let queries = store.selects(CUSTOMERS);
        assert_eq!(queries.len(), 1);
        let query = &queries[0];
        assert!(query.is_scoped_to("brand-1"));
        assert_eq!(query.limit, Some(5));
        assert!(query.order.as_ref().is_some_and(|o| o.descending));
        assert!(query.filters.iter().any(|f| matches!(
            f,
            Filter::AnyOf(alts) if alts.iter().all(|a| matches!(
                a,
                Filter::Compare { op: FilterOp::ILike, value, .. } if value == "*ana*"
            ))
        )));
    }

    #[tokio::test]
    async fn test_get_missing_customer_is_not_found() {
        let store = Arc::new(MockDataStore::new());
        let ctx = test_tool_context("brand-1", store);
        let err = GetCustomerTool
            .execute(json!({"customer_id": "nope"}), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Customer not found");
    }

    #[tokio::test]
    async fn test_create_sets_tenant_and_copies_fields() {
        let store = Arc::new(MockDataStore::new());
        let ctx = test_tool_context("brand-1", store.clone());

        let row = CreateCustomerTool
            .execute(
                json!({"name": "Ana", "email": "ana@example.com", "brand_id": "other"}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(row["brand_id"], "brand-1");
        assert_eq!(row["email"], "ana@example.com");
        assert!(row.get("phone").is_none());
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let store = Arc::new(MockDataStore::new());
        let ctx = test_tool_context("brand-1", store.clone());
        let err = UpdateCustomerTool
            .execute(json!({"customer_id": "c1"}), &ctx)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_patches_scoped_row() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_update(CUSTOMERS, Ok(json!([{"id": "c1", "phone": "555"}])));
        let ctx = test_tool_context("brand-1", store.clone());

        let row = UpdateCustomerTool
            .execute(json!({"customer_id": "c1", "phone": "555"}), &ctx)
            .await
            .unwrap();
        assert_eq!(row["phone"], "555");

        let requests = store.requests();
        let StoreRequest::Update { query, patch } = &requests[0] else {
            panic!("expected update, got {:?}", requests[0]);
        };
        assert!(query.is_scoped_to("brand-1"));
        assert_eq!(patch["phone"], "555");
        assert!(patch.get("updated_at").is_some());
    }
}
