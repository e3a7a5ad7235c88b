// ABOUTME: Defines ToolOutcome, the normalized result of one tool invocation
// ABOUTME: Converts outcomes into the MCP tools/call content payload
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Tool Result Types
//!
//! Every invocation, including unknown tools and invalid input, ends as a
//! [`ToolOutcome`]. The protocol layer turns it into a `tools/call` result;
//! failures stay JSON-RPC successes flagged with `isError`.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};

use crate::mcp::schema::{Content, ToolResponse};

/// Outcome of one tool invocation
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": ...}`; the flag follows the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Tool ran and produced data
    Success {
        /// Tool output
        data: Value,
    },
    /// Tool could not run or reported an error
    Failure {
        /// Error message
        error: String,
    },
}

impl ToolOutcome {
    /// Successful outcome
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self::Success { data }
    }

    /// Failed outcome
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Whether the tool succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error message of a failed outcome
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Render as a `tools/call` result
    ///
    /// Data is pretty-printed JSON text. Failures are the compact text of
    /// `{"error": ...}` and set `isError`.
    #[must_use]
    pub fn into_response(self) -> ToolResponse {
        match self {
            Self::Success { data } => ToolResponse {
                content: vec![Content::Text {
                    text: serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
                }],
                is_error: false,
            },
            Self::Failure { error } => ToolResponse {
                content: vec![Content::Text {
                    text: json!({ "error": error }).to_string(),
                }],
                is_error: true,
            },
        }
    }
}

impl Serialize for ToolOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ToolOutcome", 2)?;
        state.serialize_field("success", &self.is_success())?;
        match self {
            Self::Success { data } => state.serialize_field("data", data)?,
            Self::Failure { error } => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_renders_pretty_text() {
        let response = ToolOutcome::ok(json!({"id": "c1"})).into_response();
        assert!(!response.is_error);
        let Content::Text { text } = &response.content[0];
        assert_eq!(text, "{\n  \"id\": \"c1\"\n}");
    }

    #[test]
    fn test_failure_wraps_error_object() {
        let response = ToolOutcome::failed("Customer not found").into_response();
        assert!(response.is_error);
        let Content::Text { text } = &response.content[0];
        assert_eq!(text, r#"{"error":"Customer not found"}"#);
    }

    #[test]
    fn test_success_flag_follows_variant() {
        let outcome = ToolOutcome::Success { data: json!(null) };
        assert!(outcome.is_success());
        assert_eq!(serde_json::to_value(&outcome).unwrap()["success"], true);

        let outcome = ToolOutcome::Failure {
            error: String::new(),
        };
        assert!(!outcome.is_success());
        assert_eq!(serde_json::to_value(&outcome).unwrap()["success"], false);
    }

    #[test]
    fn test_outcome_serialization_shape() {
        assert_eq!(
            serde_json::to_value(ToolOutcome::failed("nope")).unwrap(),
            json!({"success": false, "error": "nope"})
        );
        assert_eq!(
            serde_json::to_value(ToolOutcome::ok(json!([]))).unwrap(),
            json!({"success": true, "data": []})
        );
    }
}
