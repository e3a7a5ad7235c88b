// ABOUTME: Fire-and-forget usage metering for tool invocations
// ABOUTME: Events are written by a detached task; sink failures are logged and swallowed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Usage Metering
//!
//! One [`UsageEvent`] is produced per tool invocation, success or failure.
//! [`UsageMeter::record`] hands it to a [`UsageSink`] on a detached tokio task
//! so the caller's response is never delayed or altered by metering.

use crate::errors::AppResult;
use crate::store::DataStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One tool invocation, as recorded for billing and analytics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    /// Key that authorized the call
    pub api_key_id: String,
    /// Tenant (brand) the call ran under
    pub tenant_id: String,
    /// Tool name as requested
    pub tool_name: String,
    /// User who owns the key
    pub caller_user_id: String,
    /// Whether the tool reported success
    pub success: bool,
    /// Wall-clock duration of the invocation
    pub duration_ms: u64,
    /// Failure message, when the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Destination for usage events
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Persist one event
    async fn record(&self, event: UsageEvent) -> AppResult<()>;
}

/// Writes usage events as rows of the usage log table
pub struct StoreUsageSink {
    store: Arc<dyn DataStore>,
    table: String,
}

impl StoreUsageSink {
    /// Create a sink writing to `table`
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl UsageSink for StoreUsageSink {
    async fn record(&self, event: UsageEvent) -> AppResult<()> {
        let row = json!({
            "api_key_id": event.api_key_id,
            "brand_id": event.tenant_id,
            "tool_name": event.tool_name,
            "user_id": event.caller_user_id,
            "success": event.success,
            "response_time_ms": event.duration_ms,
            "error_message": event.error_message,
        });
        self.store.insert(&self.table, row).await?;
        Ok(())
    }
}

/// Detaches usage writes from the request path
#[derive(Clone)]
pub struct UsageMeter {
    sink: Arc<dyn UsageSink>,
}

impl UsageMeter {
    /// Create a meter over a sink
    #[must_use]
    pub fn new(sink: Arc<dyn UsageSink>) -> Self {
        Self { sink }
    }

    /// Record an event on a detached task
    ///
    /// The returned handle may be dropped; it exists so tests can wait for
    /// the write.
    pub fn record(&self, event: UsageEvent) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let tool = event.tool_name.clone();
            match sink.record(event).await {
                Ok(()) => debug!(mcp.tool = %tool, "Usage event recorded"),
                Err(e) => warn!(mcp.tool = %tool, "Failed to record usage event: {e}"),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::test_utils::{MockDataStore, RecordingUsageSink};
    use serde_json::Value;

    fn event(success: bool) -> UsageEvent {
        UsageEvent {
            api_key_id: "key-1".into(),
            tenant_id: "brand-1".into(),
            tool_name: "list_services".into(),
            caller_user_id: "user-1".into(),
            success,
            duration_ms: 12,
            error_message: (!success).then(|| "boom".to_owned()),
        }
    }

    #[test]
    fn test_event_wire_shape() {
        let value = serde_json::to_value(event(true)).unwrap();
        assert_eq!(value["apiKeyId"], "key-1");
        assert_eq!(value["durationMs"], 12);
        assert!(value.get("errorMessage").is_none());
    }

    #[tokio::test]
    async fn test_meter_delivers_event() {
        let sink = Arc::new(RecordingUsageSink::default());
        let meter = UsageMeter::new(sink.clone());
        meter.record(event(false)).await.unwrap();
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].error_message.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let sink = Arc::new(RecordingUsageSink::failing());
        let meter = UsageMeter::new(sink);
        // The task must complete without panicking
        meter.record(event(true)).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_sink_writes_usage_row() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_insert("api_usage_logs", Ok(Value::Array(vec![])));
        let sink = StoreUsageSink::new(store.clone(), "api_usage_logs");
        sink.record(event(true)).await.unwrap();

        let inserts = store.inserted_rows("api_usage_logs");
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0]["brand_id"], "brand-1");
        assert_eq!(inserts[0]["tool_name"], "list_services");
    }

    #[tokio::test]
    async fn test_store_sink_propagates_store_error() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_insert(
            "api_usage_logs",
            Err(AppError::external_service("data store", "down")),
        );
        let sink = StoreUsageSink::new(store, "api_usage_logs");
        assert!(sink.record(event(true)).await.is_err());
    }
}
