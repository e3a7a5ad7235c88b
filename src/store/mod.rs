// ABOUTME: Typed description of data store operations and the DataStore trait
// ABOUTME: Every tool and the authenticator talk to the remote store through this seam
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Data Store Abstraction
//!
//! Requests to the remote relational store are described as plain values
//! ([`StoreRequest`], [`QuerySpec`]) and handed to one
//! [`DataStore::execute`] entry point. The production implementation speaks
//! the PostgREST dialect over HTTP ([`rest::RestDataStore`]); tests use the
//! in-memory double in `test_utils`.

/// PostgREST-over-HTTP implementation
pub mod rest;

pub use rest::RestDataStore;

use crate::constants::tables::TENANT_COLUMN;
use crate::errors::AppResult;
use async_trait::async_trait;
use serde_json::Value;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equality
    Eq,
    /// Case-insensitive pattern match; `*` is the wildcard
    ILike,
}

impl FilterOp {
    /// PostgREST operator keyword
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::ILike => "ilike",
        }
    }
}

/// One row filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column <op> value`
    Compare {
        /// Column name
        column: String,
        /// Operator
        op: FilterOp,
        /// Literal value, rendered as text
        value: String,
    },
    /// Any of the nested comparisons holds
    AnyOf(Vec<Filter>),
}

impl Filter {
    /// `column = value`
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Compare {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// `column ILIKE pattern`
    #[must_use]
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Compare {
            column: column.into(),
            op: FilterOp::ILike,
            value: pattern.into(),
        }
    }
}

/// Sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column to sort by
    pub column: String,
    /// Descending when true
    pub descending: bool,
}

/// Row selection against one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Table name
    pub table: String,
    /// Column projection; `None` selects every column
    pub columns: Option<String>,
    /// Conjunction of filters
    pub filters: Vec<Filter>,
    /// Optional ordering
    pub order: Option<Order>,
    /// Optional row cap
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Unfiltered selection of `table`
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Selection of `table` restricted to one tenant
    #[must_use]
    pub fn scoped(table: impl Into<String>, tenant_id: &str) -> Self {
        Self::table(table).filter(Filter::eq(TENANT_COLUMN, tenant_id))
    }

    /// Restrict the projection
    #[must_use]
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an equality filter
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Sort by `column`
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    /// Cap the row count
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the query carries an explicit equality filter on the tenant column
    #[must_use]
    pub fn is_scoped_to(&self, tenant_id: &str) -> bool {
        self.filters.iter().any(|f| {
            matches!(f, Filter::Compare { column, op: FilterOp::Eq, value }
                if column == TENANT_COLUMN && value == tenant_id)
        })
    }
}

/// One operation against the data store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    /// Read rows
    Select(QuerySpec),
    /// Insert one row, returning the stored representation
    Insert {
        /// Target table
        table: String,
        /// Row to insert
        row: Value,
    },
    /// Patch the rows matched by `query`, returning them
    Update {
        /// Rows to patch
        query: QuerySpec,
        /// Column values to set
        patch: Value,
    },
    /// Delete the rows matched by the query
    Delete(QuerySpec),
    /// Call a stored procedure
    Rpc {
        /// Procedure name
        function: String,
        /// Named arguments
        args: Value,
    },
}

impl StoreRequest {
    /// Short operation label for logs
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
            Self::Rpc { .. } => "rpc",
        }
    }

    /// Table or procedure name for logs
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Select(query) | Self::Delete(query) | Self::Update { query, .. } => &query.table,
            Self::Insert { table, .. } => table,
            Self::Rpc { function, .. } => function,
        }
    }
}

/// Remote relational store
///
/// `execute` returns the JSON body the store produced: an array of rows for
/// table operations, or whatever the procedure returns for `Rpc`.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Run one request
    async fn execute(&self, request: StoreRequest) -> AppResult<Value>;

    /// Read rows
    async fn select(&self, query: QuerySpec) -> AppResult<Vec<Value>> {
        rows(self.execute(StoreRequest::Select(query)).await?)
    }

    /// Insert one row and return it
    async fn insert(&self, table: &str, row: Value) -> AppResult<Option<Value>> {
        let inserted = rows(
            self.execute(StoreRequest::Insert {
                table: table.to_owned(),
                row,
            })
            .await?,
        )?;
        Ok(inserted.into_iter().next())
    }

    /// Patch matching rows and return them
    async fn update(&self, query: QuerySpec, patch: Value) -> AppResult<Vec<Value>> {
        rows(self.execute(StoreRequest::Update { query, patch }).await?)
    }

    /// Delete matching rows and return them
    async fn delete(&self, query: QuerySpec) -> AppResult<Vec<Value>> {
        rows(self.execute(StoreRequest::Delete(query)).await?)
    }

    /// Call a stored procedure
    async fn rpc(&self, function: &str, args: Value) -> AppResult<Value> {
        self.execute(StoreRequest::Rpc {
            function: function.to_owned(),
            args,
        })
        .await
    }
}

fn rows(body: Value) -> AppResult<Vec<Value>> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        object @ Value::Object(_) => Ok(vec![object]),
        other => Err(crate::errors::AppError::external_service(
            "data store",
            format!("expected rows, got {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_query_carries_tenant_filter() {
        let query = QuerySpec::scoped("customers", "brand-1").limit(5);
        assert!(query.is_scoped_to("brand-1"));
        assert!(!query.is_scoped_to("brand-2"));
        assert!(!QuerySpec::table("customers").is_scoped_to("brand-1"));
    }

    #[test]
    fn test_request_labels() {
        let request = StoreRequest::Rpc {
            function: "validate_api_key".into(),
            args: Value::Null,
        };
        assert_eq!(request.operation(), "rpc");
        assert_eq!(request.target(), "validate_api_key");

        let update = StoreRequest::Update {
            query: QuerySpec::table("expedientes"),
            patch: Value::Null,
        };
        assert_eq!(update.target(), "expedientes");
    }

    #[test]
    fn test_rows_normalization() {
        assert_eq!(rows(Value::Null).unwrap().len(), 0);
        assert_eq!(rows(serde_json::json!({"id": 1})).unwrap().len(), 1);
        assert!(rows(serde_json::json!(3)).is_err());
    }
}
