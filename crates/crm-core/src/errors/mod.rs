// ABOUTME: Unified error type and error codes for the gateway
// ABOUTME: Every fallible operation in the workspace returns AppResult<T>
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # Unified Error Handling System
//!
//! Centralized error handling for the CRM MCP gateway. [`AppError`] is what
//! the data store and tool executors fail with; the registry turns it into a
//! tool failure and never lets it reach the wire. JSON-RPC protocol errors are
//! built separately by the gateway's `jsonrpc` module; auth failures use the
//! closed [`AuthFailure`] table in [`auth`].

/// Closed authentication failure taxonomy
pub mod auth;

pub use auth::{AuthFailure, AuthFailureEntry};

use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Input failed validation
    InvalidInput,
    /// A required field is absent
    MissingRequiredField,

    // Resource Management (4000-4999)
    /// Requested record does not exist in the caller's tenant
    ResourceNotFound,

    // External Services (5000-5999)
    /// The data store answered with an error
    ExternalServiceError,
    /// The data store could not be reached
    ExternalServiceUnavailable,

    // Configuration (6000-6999)
    /// Server configuration is missing or invalid
    ConfigError,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    InternalError,
    /// JSON (de)serialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "The data store returned an error",
            Self::ExternalServiceUnavailable => "The data store is currently unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details for the client (null when absent)
    pub details: Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service could not be reached
    #[must_use]
    pub fn service_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Whether this error came from input validation
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidInput | ErrorCode::MissingRequiredField
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_description_and_message() {
        let error = AppError::not_found("Customer");
        assert_eq!(
            error.to_string(),
            "The requested resource was not found: Customer not found"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(AppError::invalid_input("bad").is_validation());
        assert!(AppError::missing_field("name").is_validation());
        assert!(!AppError::internal("boom").is_validation());
    }

    #[test]
    fn test_serde_failure_keeps_its_source() {
        let cause = serde_json::from_str::<Value>("{").unwrap_err();
        let error = AppError::from(cause);
        assert_eq!(error.code, ErrorCode::SerializationError);
        assert!(StdError::source(&error).is_some());
    }
}
