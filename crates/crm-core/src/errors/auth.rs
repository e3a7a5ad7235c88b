// ABOUTME: Closed taxonomy of API key authentication failures
// ABOUTME: Maps each failure kind to a fixed JSON-RPC code, HTTP status, and client hint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

use crate::constants::errors::{
    ERROR_AUTH_EXPIRED_KEY, ERROR_AUTH_INACTIVE_KEY, ERROR_AUTH_INTERNAL,
    ERROR_AUTH_INVALID_FORMAT, ERROR_AUTH_INVALID_KEY, ERROR_AUTH_MISSING_KEY,
    ERROR_RATE_LIMIT_EXCEEDED, ERROR_SERVER_CONFIG,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    /// No `x-api-key` header and no usable bearer token
    MissingKey,
    /// Key does not start with the required prefix
    InvalidFormat,
    /// Key is unknown to the validation service
    NotFound,
    /// Key was deactivated
    Inactive,
    /// Key expired
    Expired,
    /// Monthly quota exhausted
    RateLimit,
    /// Validation service is misconfigured or rejected our credential
    ConfigError,
    /// Validation failed unexpectedly
    InternalError,
}

/// Fixed wire description of an [`AuthFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthFailureEntry {
    /// JSON-RPC error code in the reserved server block
    pub code: i32,
    /// HTTP status of the response carrying the error
    pub http_status: u16,
    /// Machine readable tag echoed in `error.data.error`
    pub tag: &'static str,
    /// Human readable error message
    pub message: &'static str,
    /// Remediation hint for the caller
    pub hint: &'static str,
}

impl AuthFailure {
    /// Every failure kind, in code order
    pub const ALL: [Self; 8] = [
        Self::MissingKey,
        Self::InvalidFormat,
        Self::NotFound,
        Self::Inactive,
        Self::Expired,
        Self::RateLimit,
        Self::ConfigError,
        Self::InternalError,
    ];

    /// Wire description for this failure
    #[must_use]
    pub const fn entry(self) -> AuthFailureEntry {
        match self {
            Self::MissingKey => AuthFailureEntry {
                code: ERROR_AUTH_MISSING_KEY,
                http_status: 401,
                tag: "missing_api_key",
                message: "API key required",
                hint: "Send your key in the x-api-key header",
            },
            Self::InvalidFormat => AuthFailureEntry {
                code: ERROR_AUTH_INVALID_FORMAT,
                http_status: 401,
                tag: "invalid_format",
                message: "Invalid API key format",
                hint: "Copy the full key from your dashboard, including its prefix",
            },
            Self::NotFound => AuthFailureEntry {
                code: ERROR_AUTH_INVALID_KEY,
                http_status: 401,
                tag: "not_found",
                message: "Invalid API key",
                hint: "Check that the key was not revoked or mistyped",
            },
            Self::Inactive => AuthFailureEntry {
                code: ERROR_AUTH_INACTIVE_KEY,
                http_status: 401,
                tag: "inactive",
                message: "API key is inactive",
                hint: "Reactivate the key or create a new one in your dashboard",
            },
            Self::Expired => AuthFailureEntry {
                code: ERROR_AUTH_EXPIRED_KEY,
                http_status: 401,
                tag: "expired",
                message: "API key has expired",
                hint: "Create a new key in your dashboard",
            },
            Self::RateLimit => AuthFailureEntry {
                code: ERROR_RATE_LIMIT_EXCEEDED,
                http_status: 401,
                tag: "rate_limit",
                message: "Monthly call limit exceeded",
                hint: "Wait for the monthly reset or upgrade your plan",
            },
            Self::ConfigError => AuthFailureEntry {
                code: ERROR_SERVER_CONFIG,
                http_status: 500,
                tag: "config_error",
                message: "Server configuration error",
                hint: "Contact support; the server cannot validate keys right now",
            },
            Self::InternalError => AuthFailureEntry {
                code: ERROR_AUTH_INTERNAL,
                http_status: 500,
                tag: "internal_error",
                message: "Authentication failed due to an internal error",
                hint: "Retry shortly; contact support if the problem persists",
            },
        }
    }

    /// Map an error tag reported by the validation service
    ///
    /// Unknown tags are treated as internal errors, never as success.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "missing_api_key" => Self::MissingKey,
            "invalid_format" => Self::InvalidFormat,
            "not_found" | "invalid_key" => Self::NotFound,
            "inactive" => Self::Inactive,
            "expired" => Self::Expired,
            "rate_limit" | "rate_limited" => Self::RateLimit,
            "config_error" => Self::ConfigError,
            _ => Self::InternalError,
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry().tag)
    }
}
