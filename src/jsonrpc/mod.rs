// ABOUTME: JSON-RPC 2.0 message, response, and error types for the MCP endpoint
// ABOUTME: Includes per-message formation checks applied before any dispatch
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # JSON-RPC 2.0 Foundation
//!
//! Wire types shared by every transport flavor. Messages are decoded from a
//! raw [`serde_json::Value`] rather than through a derived `Deserialize` so
//! that formation problems (wrong `jsonrpc` literal, missing `method`) can be
//! reported per message, including inside a batch, while still echoing the
//! caller's `id` when one was supplied.
//!
//! ```rust
//! use crm_mcp_server::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
//! # use serde_json::json;
//!
//! let request = JsonRpcRequest::with_id("ping", None, json!(7));
//! let response = JsonRpcResponse::success(request.id.clone(), json!({}));
//! assert!(response.is_success());
//! ```

use crate::constants::errors::{ERROR_INVALID_REQUEST, ERROR_PARSE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::constants::protocol::JSONRPC_VERSION;

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Method name to invoke
    pub method: String,

    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Request identifier; `None` marks a notification, `Some(Null)` is a
    /// request whose id happens to be null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response
///
/// Exactly one of `result` or `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request identifier for correlation (`null` for top-level errors)
    pub id: Option<Value>,

    /// Result of the method call (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error information (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error Object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Additional error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new request with a specific ID
    #[must_use]
    pub fn with_id(method: impl Into<String>, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Create a notification (no ID, no response expected)
    #[must_use]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Whether the message carries no `id`
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Decode and validate one message
    ///
    /// # Errors
    ///
    /// Returns a ready-to-send `-32600` response when the value is not an
    /// object, `id` is not a string, number, or null, `jsonrpc` is not
    /// `"2.0"`, or `method` is missing or empty. The response echoes the
    /// message id when that id is well-formed.
    pub fn from_value(value: Value) -> Result<Self, JsonRpcResponse> {
        let Value::Object(mut object) = value else {
            return Err(JsonRpcResponse::invalid_request(
                None,
                "Invalid Request: message must be a JSON object",
            ));
        };

        let id = match object.remove("id") {
            Some(Value::Object(_) | Value::Array(_) | Value::Bool(_)) => {
                return Err(JsonRpcResponse::invalid_request(
                    None,
                    "Invalid Request: id must be a string, number, or null",
                ));
            }
            id => id,
        };

        match object.get("jsonrpc").and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            other => {
                return Err(JsonRpcResponse::invalid_request(
                    id,
                    format!(
                        "Invalid Request: jsonrpc must be \"{JSONRPC_VERSION}\", got {}",
                        other.map_or_else(|| "nothing".to_owned(), |v| format!("\"{v}\""))
                    ),
                ));
            }
        }

        let method = match object.remove("method") {
            Some(Value::String(method)) if !method.is_empty() => method,
            _ => {
                return Err(JsonRpcResponse::invalid_request(
                    id,
                    "Invalid Request: method must be a non-empty string",
                ));
            }
        };

        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method,
            params: object.remove("params"),
            id,
        })
    }
}

impl JsonRpcResponse {
    /// Create a success response
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError::new(code, message)),
        }
    }

    /// Create an error response with additional data
    #[must_use]
    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError::with_data(code, message, data)),
        }
    }

    /// `-32700` response for an unparseable body
    #[must_use]
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::error(None, ERROR_PARSE, format!("Parse error: {detail}"))
    }

    /// `-32600` response for a malformed message
    #[must_use]
    pub fn invalid_request(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, ERROR_INVALID_REQUEST, message)
    }

    /// Check if this is a success response
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    /// Check if this is an error response
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl JsonRpcError {
    /// Create a new error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with data
    #[must_use]
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_null_id_distinct_from_missing() {
        let with_null = JsonRpcRequest::from_value(json!({
            "jsonrpc": "2.0", "id": null, "method": "ping"
        }))
        .unwrap();
        assert_eq!(with_null.id, Some(Value::Null));
        assert!(!with_null.is_notification());

        let without = JsonRpcRequest::from_value(json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(without.is_notification());
    }

    #[test]
    fn test_wrong_version_is_invalid_request_with_echoed_id() {
        let err = JsonRpcRequest::from_value(json!({
            "jsonrpc": "1.0", "id": "abc", "method": "ping"
        }))
        .unwrap_err();
        assert_eq!(err.id, Some(json!("abc")));
        assert_eq!(err.error.unwrap().code, ERROR_INVALID_REQUEST);
    }

    #[test]
    fn test_empty_method_is_invalid_request() {
        let err = JsonRpcRequest::from_value(json!({
            "jsonrpc": "2.0", "id": 3, "method": ""
        }))
        .unwrap_err();
        assert_eq!(err.error.unwrap().code, ERROR_INVALID_REQUEST);
    }

    #[test]
    fn test_structured_id_is_invalid_request_without_echo() {
        for id in [json!({ "a": 1 }), json!([1]), json!(true)] {
            let err = JsonRpcRequest::from_value(json!({
                "jsonrpc": "2.0", "id": id, "method": "ping"
            }))
            .unwrap_err();
            assert_eq!(err.id, None);
            assert_eq!(err.error.unwrap().code, ERROR_INVALID_REQUEST);
        }
    }

    #[test]
    fn test_non_object_is_invalid_request() {
        let err = JsonRpcRequest::from_value(json!(42)).unwrap_err();
        assert_eq!(err.id, None);
        assert!(err.is_error());
    }

    #[test]
    fn test_response_field_order_and_null_id() {
        let response = JsonRpcResponse::parse_error("expected value");
        let text = serde_json::to_string(&response).unwrap();
        assert!(text.starts_with(r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700"#));

        let ok = JsonRpcResponse::success(Some(json!(1)), json!({}));
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":{}}"#
        );
    }
}
