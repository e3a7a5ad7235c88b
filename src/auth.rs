// ABOUTME: API key authentication against the data store's validation procedure
// ABOUTME: Extracts the key from request headers and maps validation results to AuthContext or AuthFailure
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! # API Key Authentication
//!
//! Every protected request is revalidated: there is no in-process cache. A
//! key that lacks the configured prefix is rejected locally; anything else
//! costs exactly one call to the validation procedure.

use crate::config::AuthConfig;
use crate::constants::headers;
use crate::errors::{AppError, AuthFailure};
use crate::logging::AppLogger;
use crate::store::{rest::rejection_status, DataStore};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Subscription tier of the tenant owning a key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyTier {
    /// Free plan
    #[default]
    Free,
    /// Starter plan
    Starter,
    /// Professional plan
    Pro,
    /// Enterprise plan
    Enterprise,
}

impl ApiKeyTier {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

impl Display for ApiKeyTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKeyTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "starter" => Ok(Self::Starter),
            "pro" | "professional" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(AppError::invalid_input(format!("Invalid API key tier: {s}"))),
        }
    }
}

/// Identity of an authenticated caller, valid for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// Key record identifier
    pub api_key_id: String,
    /// Tenant (brand) identifier
    pub tenant_id: String,
    /// Tenant display name
    pub tenant_name: String,
    /// Subscription tier
    pub tier: ApiKeyTier,
    /// User owning the key
    pub caller_user_id: String,
    /// Email of the owning user
    pub caller_email: String,
    /// Role of the owning user within the tenant
    pub caller_role: String,
    /// Calls left in the current month, when metered
    pub remaining_calls: Option<i64>,
    /// Monthly allowance, when metered
    pub monthly_limit: Option<i64>,
}

impl AuthContext {
    /// Whether the monthly allowance is used up
    #[must_use]
    pub fn quota_exhausted(&self) -> bool {
        self.remaining_calls.is_some_and(|remaining| remaining <= 0)
    }
}

/// Result of authenticating one request
pub type AuthOutcome = Result<AuthContext, AuthFailure>;

/// Pull the raw key from request headers
///
/// `x-api-key` wins. The `Authorization: Bearer` fallback is only taken when
/// the token carries `prefix`, so unrelated bearer tokens read as "no key".
#[must_use]
pub fn extract_api_key(request_headers: &HeaderMap, prefix: &str) -> Option<String> {
    if let Some(key) = request_headers
        .get(headers::API_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(key.to_owned());
    }

    request_headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(headers::BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| token.starts_with(prefix))
        .map(str::to_owned)
}

/// Row returned by the validation procedure
#[derive(Debug, Default, Deserialize)]
struct ValidationRow {
    #[serde(default)]
    valid: bool,
    error: Option<String>,
    api_key_id: Option<Value>,
    brand_id: Option<Value>,
    brand_name: Option<String>,
    tier: Option<String>,
    user_id: Option<Value>,
    user_email: Option<String>,
    user_role: Option<String>,
    remaining_calls: Option<i64>,
    monthly_limit: Option<i64>,
}

/// Validates API keys through the data store
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn DataStore>,
    config: AuthConfig,
}

impl Authenticator {
    /// Create an authenticator
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Configured key prefix
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    /// Extract the key from `request_headers` and authenticate it
    pub async fn authenticate_headers(&self, request_headers: &HeaderMap) -> AuthOutcome {
        let key = extract_api_key(request_headers, &self.config.key_prefix);
        self.authenticate(key.as_deref()).await
    }

    /// Authenticate a raw key
    pub async fn authenticate(&self, raw_key: Option<&str>) -> AuthOutcome {
        let outcome = self.validate(raw_key).await;
        match &outcome {
            Ok(ctx) => AppLogger::log_auth_event(Some(&ctx.tenant_id), "valid", true),
            Err(failure) => AppLogger::log_auth_event(None, failure.entry().tag, false),
        }
        outcome
    }

    async fn validate(&self, raw_key: Option<&str>) -> AuthOutcome {
        let key = raw_key.ok_or(AuthFailure::MissingKey)?;
        if !key.starts_with(&self.config.key_prefix) {
            return Err(AuthFailure::InvalidFormat);
        }

        let body = self
            .store
            .rpc(&self.config.validation_rpc, json!({ "p_api_key": key }))
            .await
            .map_err(|e| {
                if matches!(rejection_status(&e), Some(401 | 403)) {
                    warn!("Key validation rejected the service credential: {e}");
                    AuthFailure::ConfigError
                } else {
                    warn!("Key validation failed: {e}");
                    AuthFailure::InternalError
                }
            })?;

        let row = match body {
            Value::Array(rows) => rows.into_iter().next().ok_or(AuthFailure::NotFound)?,
            Value::Null => return Err(AuthFailure::NotFound),
            other => other,
        };

        let row: ValidationRow = serde_json::from_value(row).map_err(|e| {
            warn!("Unreadable key validation result: {e}");
            AuthFailure::InternalError
        })?;

        if !row.valid {
            return Err(row
                .error
                .as_deref()
                .map_or(AuthFailure::NotFound, AuthFailure::from_tag));
        }

        Self::context_from(row)
    }

    fn context_from(row: ValidationRow) -> AuthOutcome {
        let (Some(api_key_id), Some(tenant_id)) = (
            row.api_key_id.as_ref().and_then(id_string),
            row.brand_id.as_ref().and_then(id_string),
        ) else {
            warn!("Key validation reported valid without key or brand id");
            return Err(AuthFailure::InternalError);
        };

        let tier = row
            .tier
            .as_deref()
            .map(|t| {
                t.parse().unwrap_or_else(|_| {
                    debug!("Unknown tier {t}, treating as free");
                    ApiKeyTier::Free
                })
            })
            .unwrap_or_default();

        Ok(AuthContext {
            api_key_id,
            tenant_id,
            tenant_name: row.brand_name.unwrap_or_default(),
            tier,
            caller_user_id: row.user_id.as_ref().and_then(id_string).unwrap_or_default(),
            caller_email: row.user_email.unwrap_or_default(),
            caller_role: row.user_role.unwrap_or_default(),
            remaining_calls: row.remaining_calls,
            monthly_limit: row.monthly_limit,
        })
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// HTTP rejection carrying an [`AuthFailure`] as a JSON-RPC error body
#[derive(Debug, Clone)]
pub struct AuthRejection {
    /// Failure kind
    pub failure: AuthFailure,
    /// Documentation pointer
    pub docs_url: String,
}

impl AuthRejection {
    /// JSON-RPC error envelope with a `null` id
    #[must_use]
    pub fn body(&self) -> Value {
        let entry = self.failure.entry();
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {
                "code": entry.code,
                "message": entry.message,
                "data": {
                    "error": entry.tag,
                    "hint": entry.hint,
                    "docs": self.docs_url,
                }
            }
        })
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.failure.entry().http_status)
            .unwrap_or(StatusCode::UNAUTHORIZED);
        (status, Json(self.body())).into_response()
    }
}

/// First day of the month after `today`, when monthly quotas reset
#[must_use]
pub fn next_monthly_reset(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::test_utils::{valid_key_row, MockDataStore};
    use axum::http::HeaderValue;

    fn authenticator(store: Arc<MockDataStore>) -> Authenticator {
        let config = ServerConfig::with_data_store("http://store.invalid", "svc");
        Authenticator::new(store, config.auth)
    }

    #[test]
    fn test_extract_prefers_x_api_key() {
        let mut map = HeaderMap::new();
        map.insert("x-api-key", HeaderValue::from_static("crm_primary"));
        map.insert("authorization", HeaderValue::from_static("Bearer crm_other"));
        assert_eq!(extract_api_key(&map, "crm_").as_deref(), Some("crm_primary"));
    }

    #[test]
    fn test_extract_bearer_requires_prefix() {
        let mut map = HeaderMap::new();
        map.insert("authorization", HeaderValue::from_static("Bearer crm_abc"));
        assert_eq!(extract_api_key(&map, "crm_").as_deref(), Some("crm_abc"));

        map.insert("authorization", HeaderValue::from_static("Bearer eyJhbGciOi"));
        assert_eq!(extract_api_key(&map, "crm_"), None);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = Arc::new(MockDataStore::new());
        let outcome = authenticator(store.clone()).authenticate(None).await;
        assert_eq!(outcome, Err(AuthFailure::MissingKey));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_prefix_makes_no_store_call() {
        let store = Arc::new(MockDataStore::new());
        let outcome = authenticator(store.clone())
            .authenticate(Some("sk_live_123"))
            .await;
        assert_eq!(outcome, Err(AuthFailure::InvalidFormat));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_key_builds_context_from_array_result() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_rpc(
            "validate_api_key",
            Ok(Value::Array(vec![valid_key_row("brand-1", Some(42))])),
        );

        let ctx = authenticator(store.clone())
            .authenticate(Some("crm_good"))
            .await
            .unwrap();
        assert_eq!(ctx.tenant_id, "brand-1");
        assert_eq!(ctx.tier, ApiKeyTier::Pro);
        assert_eq!(ctx.remaining_calls, Some(42));
        assert!(!ctx.quota_exhausted());
        assert_eq!(store.call_count(), 1);
        assert_eq!(store.rpc_args("validate_api_key")[0]["p_api_key"], "crm_good");
    }

    #[tokio::test]
    async fn test_invalid_result_maps_error_tag() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_rpc(
            "validate_api_key",
            Ok(json!({ "valid": false, "error": "expired" })),
        );
        let outcome = authenticator(store).authenticate(Some("crm_old")).await;
        assert_eq!(outcome, Err(AuthFailure::Expired));
    }

    #[tokio::test]
    async fn test_store_credential_rejection_is_config_error() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_rpc(
            "validate_api_key",
            Err(AppError::external_service("data store", "Invalid API key")
                .with_details(json!({ "status": 401 }))),
        );
        let outcome = authenticator(store).authenticate(Some("crm_x")).await;
        assert_eq!(outcome, Err(AuthFailure::ConfigError));
    }

    #[tokio::test]
    async fn test_store_outage_is_internal_error() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_rpc(
            "validate_api_key",
            Err(AppError::service_unavailable("data store", "timeout")),
        );
        let outcome = authenticator(store).authenticate(Some("crm_x")).await;
        assert_eq!(outcome, Err(AuthFailure::InternalError));
    }

    #[tokio::test]
    async fn test_valid_without_ids_is_never_success() {
        let store = Arc::new(MockDataStore::new());
        store.respond_to_rpc("validate_api_key", Ok(json!({ "valid": true })));
        let outcome = authenticator(store).authenticate(Some("crm_x")).await;
        assert_eq!(outcome, Err(AuthFailure::InternalError));
    }

    #[test]
    fn test_rejection_body_shape() {
        let rejection = AuthRejection {
            failure: AuthFailure::MissingKey,
            docs_url: "https://docs.example.com/mcp".into(),
        };
        let body = rejection.body();
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32001);
        assert_eq!(body["error"]["data"]["error"], "missing_api_key");
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_next_monthly_reset() {
        let mid = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(next_monthly_reset(mid), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        let december = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            next_monthly_reset(december),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
