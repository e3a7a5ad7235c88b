// ABOUTME: PostgREST-dialect HTTP client implementing the DataStore trait
// ABOUTME: Renders QuerySpec values into query strings and maps store failures into AppError
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use super::{DataStore, Filter, QuerySpec, StoreRequest};
use crate::config::{DataStoreConfig, HttpClientConfig};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use serde_json::Value;
use std::time::Instant;
use tracing::warn;

const SERVICE: &str = "data store";
const REST_PREFIX: &str = "/rest/v1";

/// HTTP client for a PostgREST-compatible store
#[derive(Clone)]
pub struct RestDataStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestDataStore {
    /// Build a client with explicit request and connect timeouts
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TLS backend cannot be initialized
    pub fn new(store: &DataStoreConfig, http: &HttpClientConfig) -> AppResult<Self> {
        let client = ClientBuilder::new()
            .timeout(http.timeout())
            .connect_timeout(http.connect_timeout())
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: store.url.trim_end_matches('/').to_owned(),
            service_key: store.service_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{REST_PREFIX}/{path}", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn build(&self, request: &StoreRequest) -> AppResult<RequestBuilder> {
        let builder = match request {
            StoreRequest::Select(query) => self
                .request(Method::GET, &query.table)
                .query(&postgrest_params(query)),
            StoreRequest::Insert { table, row } => self
                .request(Method::POST, table)
                .header("Prefer", "return=representation")
                .json(row),
            StoreRequest::Update { query, patch } => {
                require_filters(query)?;
                self.request(Method::PATCH, &query.table)
                    .header("Prefer", "return=representation")
                    .query(&filter_params(query))
                    .json(patch)
            }
            StoreRequest::Delete(query) => {
                require_filters(query)?;
                self.request(Method::DELETE, &query.table)
                    .header("Prefer", "return=representation")
                    .query(&filter_params(query))
            }
            StoreRequest::Rpc { function, args } => self
                .request(Method::POST, &format!("rpc/{function}"))
                .json(args),
        };
        Ok(builder)
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn execute(&self, request: StoreRequest) -> AppResult<Value> {
        let start = Instant::now();
        let result = self.send(&request).await;
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_store_operation(
            request.operation(),
            request.target(),
            result.is_ok(),
            elapsed,
        );
        result
    }
}

impl RestDataStore {
    async fn send(&self, request: &StoreRequest) -> AppResult<Value> {
        let response = self.build(request)?.send().await.map_err(|e| {
            let message = format!("{} {} failed: {e}", request.operation(), request.target());
            if e.is_timeout() || e.is_connect() {
                AppError::service_unavailable(SERVICE, message).with_source(e)
            } else {
                AppError::external_service(SERVICE, message).with_source(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to read response body: {e}"))
                .with_source(e)
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(
                store.operation = request.operation(),
                store.target = request.target(),
                status = status.as_u16(),
                "Data store rejected request: {message}"
            );
            return Err(AppError::external_service(SERVICE, message)
                .with_details(serde_json::json!({ "status": status.as_u16() })));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            AppError::external_service(SERVICE, format!("Invalid JSON response: {e}"))
                .with_source(e)
        })
    }
}

/// Status code carried by a store rejection, if any
#[must_use]
pub fn rejection_status(error: &AppError) -> Option<u16> {
    error
        .details
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
}

fn require_filters(query: &QuerySpec) -> AppResult<()> {
    if query.filters.is_empty() {
        return Err(AppError::invalid_input(format!(
            "Refusing unfiltered write to {}",
            query.table
        )));
    }
    Ok(())
}

/// Full selection parameters: projection, filters, order, and limit
fn postgrest_params(query: &QuerySpec) -> Vec<(String, String)> {
    let mut params = vec![(
        "select".to_owned(),
        query.columns.clone().unwrap_or_else(|| "*".to_owned()),
    )];
    params.extend(filter_params(query));
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_owned(), limit.to_string()));
    }
    params
}

fn filter_params(query: &QuerySpec) -> Vec<(String, String)> {
    query
        .filters
        .iter()
        .map(|filter| match filter {
            Filter::Compare { column, op, value } => {
                (column.clone(), format!("{}.{value}", op.as_str()))
            }
            Filter::AnyOf(alternatives) => ("or".to_owned(), format!("({})", or_list(alternatives))),
        })
        .collect()
}

fn or_list(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::Compare { column, op, value } => {
                format!("{column}.{}.{}", op.as_str(), quote(value))
            }
            Filter::AnyOf(nested) => format!("or({})", or_list(nested)),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Double-quote a value inside a logical tree so reserved characters survive
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
