// ABOUTME: Test doubles and fixtures for the data store, usage sink, and auth context
// ABOUTME: Shared by unit tests and the integration tests under tests/
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AuthContext, ApiKeyTier};
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::mcp::resources::ServerResources;
use crate::store::{DataStore, QuerySpec, StoreRequest};
use crate::tools::ToolContext;
use crate::usage::{UsageEvent, UsageSink};

/// Key accepted by [`MockDataStore::with_valid_key`] fixtures
pub const TEST_API_KEY: &str = "crm_test_key_0123456789";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Re-buildable scripted store answer
#[derive(Debug, Clone)]
enum Scripted {
    Body(Value),
    Failure {
        code: ErrorCode,
        message: String,
        details: Value,
    },
}

impl From<AppResult<Value>> for Scripted {
    fn from(result: AppResult<Value>) -> Self {
        match result {
            Ok(body) => Self::Body(body),
            Err(e) => Self::Failure {
                code: e.code,
                message: e.message,
                details: e.details,
            },
        }
    }
}

impl Scripted {
    fn to_result(&self) -> AppResult<Value> {
        match self {
            Self::Body(body) => Ok(body.clone()),
            Self::Failure {
                code,
                message,
                details,
            } => Err(AppError::new(*code, message.clone()).with_details(details.clone())),
        }
    }
}

/// In-memory [`DataStore`] that records every request
///
/// Unscripted requests answer with an empty row set, except inserts, which
/// echo the row back with a generated `id`, and RPCs, which return `null`.
#[derive(Default)]
pub struct MockDataStore {
    requests: Mutex<Vec<StoreRequest>>,
    responses: Mutex<HashMap<(&'static str, String), Scripted>>,
}

impl MockDataStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose validation procedure accepts [`TEST_API_KEY`] for `tenant_id`
    #[must_use]
    pub fn with_valid_key(tenant_id: &str, remaining_calls: Option<i64>) -> Self {
        let store = Self::new();
        store.respond_to_rpc(
            crate::constants::defaults::API_KEY_VALIDATION_RPC,
            Ok(json!([valid_key_row(tenant_id, remaining_calls)])),
        );
        store
    }

    fn script(&self, operation: &'static str, target: &str, result: AppResult<Value>) {
        lock(&self.responses).insert((operation, target.to_owned()), result.into());
    }

    /// Answer for selects on `table`
    pub fn respond_to_select(&self, table: &str, result: AppResult<Value>) {
        self.script("select", table, result);
    }

    /// Answer for inserts into `table`
    pub fn respond_to_insert(&self, table: &str, result: AppResult<Value>) {
        self.script("insert", table, result);
    }

    /// Answer for updates of `table`
    pub fn respond_to_update(&self, table: &str, result: AppResult<Value>) {
        self.script("update", table, result);
    }

    /// Answer for deletes from `table`
    pub fn respond_to_delete(&self, table: &str, result: AppResult<Value>) {
        self.script("delete", table, result);
    }

    /// Answer for calls of `function`
    pub fn respond_to_rpc(&self, function: &str, result: AppResult<Value>) {
        self.script("rpc", function, result);
    }

    /// Every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<StoreRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of requests other than key validation
    #[must_use]
    pub fn non_auth_call_count(&self) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| !matches!(r, StoreRequest::Rpc { function, .. }
                if function == crate::constants::defaults::API_KEY_VALIDATION_RPC))
            .count()
    }

    /// Selections issued against `table`
    #[must_use]
    pub fn selects(&self, table: &str) -> Vec<QuerySpec> {
        lock(&self.requests)
            .iter()
            .filter_map(|r| match r {
                StoreRequest::Select(query) if query.table == table => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rows inserted into `table`
    #[must_use]
    pub fn inserted_rows(&self, table: &str) -> Vec<Value> {
        lock(&self.requests)
            .iter()
            .filter_map(|r| match r {
                StoreRequest::Insert { table: t, row } if t == table => Some(row.clone()),
                _ => None,
            })
            .collect()
    }

    /// Arguments passed to `function`
    #[must_use]
    pub fn rpc_args(&self, function: &str) -> Vec<Value> {
        lock(&self.requests)
            .iter()
            .filter_map(|r| match r {
                StoreRequest::Rpc { function: f, args } if f == function => Some(args.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DataStore for MockDataStore {
    async fn execute(&self, request: StoreRequest) -> AppResult<Value> {
        lock(&self.requests).push(request.clone());

        let scripted = lock(&self.responses)
            .get(&(request.operation(), request.target().to_owned()))
            .cloned();
        if let Some(scripted) = scripted {
            return scripted.to_result();
        }

        Ok(match request {
            StoreRequest::Insert { mut row, .. } => {
                if let Some(object) = row.as_object_mut() {
                    object
                        .entry("id")
                        .or_insert_with(|| json!(Uuid::new_v4().to_string()));
                }
                json!([row])
            }
            StoreRequest::Rpc { .. } => Value::Null,
            _ => json!([]),
        })
    }
}

/// [`UsageSink`] that keeps events in memory
#[derive(Default)]
pub struct RecordingUsageSink {
    events: Mutex<Vec<UsageEvent>>,
    fail: bool,
}

impl RecordingUsageSink {
    /// Sink that rejects every event after recording it
    #[must_use]
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    /// Events received so far
    #[must_use]
    pub fn events(&self) -> Vec<UsageEvent> {
        lock(&self.events).clone()
    }

    /// Wait up to two seconds for at least `count` events
    pub async fn wait_for(&self, count: usize) -> Vec<UsageEvent> {
        for _ in 0..200 {
            if lock(&self.events).len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl UsageSink for RecordingUsageSink {
    async fn record(&self, event: UsageEvent) -> AppResult<()> {
        lock(&self.events).push(event);
        if self.fail {
            return Err(AppError::external_service("usage sink", "rejected"));
        }
        Ok(())
    }
}

/// Validation procedure row for a valid key of `tenant_id`
#[must_use]
pub fn valid_key_row(tenant_id: &str, remaining_calls: Option<i64>) -> Value {
    json!({
        "valid": true,
        "api_key_id": "key-1",
        "brand_id": tenant_id,
        "brand_name": "Test Brand",
        "tier": "pro",
        "user_id": "user-1",
        "user_email": "owner@example.com",
        "user_role": "owner",
        "remaining_calls": remaining_calls,
        "monthly_limit": 1000,
    })
}

/// Authenticated caller of `tenant_id` with quota left
#[must_use]
pub fn test_auth_context(tenant_id: &str) -> AuthContext {
    AuthContext {
        api_key_id: "key-1".to_owned(),
        tenant_id: tenant_id.to_owned(),
        tenant_name: "Test Brand".to_owned(),
        tier: ApiKeyTier::Pro,
        caller_user_id: "user-1".to_owned(),
        caller_email: "owner@example.com".to_owned(),
        caller_role: "owner".to_owned(),
        remaining_calls: Some(100),
        monthly_limit: Some(1000),
    }
}

/// Tool context for `tenant_id` over `store`
#[must_use]
pub fn test_tool_context(tenant_id: &str, store: Arc<MockDataStore>) -> ToolContext {
    ToolContext::new(test_auth_context(tenant_id), store)
}

/// Configuration used by in-process servers under test
#[must_use]
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::with_data_store("http://store.invalid", "service-key");
    config.sse.keepalive_interval_secs = 1;
    config.sse.max_stream_duration_secs = 2;
    config
}

/// Server resources over the given doubles
#[must_use]
pub fn test_resources(
    store: Arc<MockDataStore>,
    sink: Arc<RecordingUsageSink>,
) -> Arc<ServerResources> {
    Arc::new(ServerResources::with_parts(test_config(), store, sink))
}
