// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses listen address, data store credentials, auth, SSE, and CORS settings
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 CRM MCP Gateway contributors

//! Environment-based configuration management for production deployment

use crate::constants::defaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type for logging and CORS decisions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Remote REST data store connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DataStoreConfig {
    /// Base URL, e.g. `https://project.example.co`
    pub url: String,
    /// Service-level credential sent on every request
    pub service_key: String,
    /// Table receiving usage events
    pub usage_log_table: String,
}

impl fmt::Debug for DataStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStoreConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("usage_log_table", &self.usage_log_table)
            .finish()
    }
}

/// API key authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Literal prefix every tenant key must carry
    pub key_prefix: String,
    /// Stored procedure used to validate keys
    pub validation_rpc: String,
    /// Documentation pointer included in auth errors
    pub docs_url: String,
    /// Upgrade pointer included in rate-limit errors
    pub upgrade_url: String,
}

/// Outbound HTTP client bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl HttpClientConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout as a [`Duration`]
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Streaming response settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Seconds between keep-alive comment frames
    pub keepalive_interval_secs: u64,
    /// Wall-clock ceiling for one stream
    pub max_stream_duration_secs: u64,
}

impl SseConfig {
    /// Keep-alive cadence as a [`Duration`]
    #[must_use]
    pub const fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    /// Stream lifetime ceiling as a [`Duration`]
    #[must_use]
    pub const fn max_stream_duration(&self) -> Duration {
        Duration::from_secs(self.max_stream_duration_secs)
    }
}

/// CORS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` allows any origin
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Whether every origin is allowed
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Data store connection
    pub data_store: DataStoreConfig,
    /// API key authentication
    pub auth: AuthConfig,
    /// Outbound HTTP bounds
    pub http_client: HttpClientConfig,
    /// Streaming responses
    pub sse: SseConfig,
    /// CORS policy
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env_or("HTTP_PORT", defaults::HTTP_PORT)?,
            host: env_var_or("HOST", defaults::HOST),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            data_store: DataStoreConfig {
                url: required_env("DATA_STORE_URL")?
                    .trim_end_matches('/')
                    .to_owned(),
                service_key: required_env("DATA_STORE_SERVICE_KEY")?,
                usage_log_table: env_var_or("USAGE_LOG_TABLE", defaults::USAGE_LOG_TABLE),
            },
            auth: AuthConfig {
                key_prefix: env_var_or("API_KEY_PREFIX", defaults::API_KEY_PREFIX),
                validation_rpc: env_var_or(
                    "API_KEY_VALIDATION_RPC",
                    defaults::API_KEY_VALIDATION_RPC,
                ),
                docs_url: env_var_or("DOCS_URL", defaults::DOCS_URL),
                upgrade_url: env_var_or("UPGRADE_URL", defaults::UPGRADE_URL),
            },
            http_client: HttpClientConfig {
                timeout_secs: parse_env_or(
                    "HTTP_CLIENT_TIMEOUT_SECS",
                    defaults::HTTP_CLIENT_TIMEOUT_SECS,
                )?,
                connect_timeout_secs: parse_env_or(
                    "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                    defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
                )?,
            },
            sse: SseConfig {
                keepalive_interval_secs: parse_env_or(
                    "SSE_KEEPALIVE_INTERVAL_SECS",
                    defaults::SSE_KEEPALIVE_INTERVAL_SECS,
                )?,
                max_stream_duration_secs: parse_env_or(
                    "SSE_MAX_STREAM_DURATION_SECS",
                    defaults::SSE_MAX_STREAM_DURATION_SECS,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Configuration with defaults and the given data store, for embedding
    /// and tests
    #[must_use]
    pub fn with_data_store(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            environment: Environment::Testing,
            data_store: DataStoreConfig {
                url: url.into(),
                service_key: service_key.into(),
                usage_log_table: defaults::USAGE_LOG_TABLE.to_owned(),
            },
            auth: AuthConfig {
                key_prefix: defaults::API_KEY_PREFIX.to_owned(),
                validation_rpc: defaults::API_KEY_VALIDATION_RPC.to_owned(),
                docs_url: defaults::DOCS_URL.to_owned(),
                upgrade_url: defaults::UPGRADE_URL.to_owned(),
            },
            http_client: HttpClientConfig {
                timeout_secs: defaults::HTTP_CLIENT_TIMEOUT_SECS,
                connect_timeout_secs: defaults::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
            },
            sse: SseConfig {
                keepalive_interval_secs: defaults::SSE_KEEPALIVE_INTERVAL_SECS,
                max_stream_duration_secs: defaults::SSE_MAX_STREAM_DURATION_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_owned()],
            },
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            anyhow::bail!("HTTP_PORT must be non-zero");
        }
        if !self.data_store.url.starts_with("http://") && !self.data_store.url.starts_with("https://")
        {
            anyhow::bail!("DATA_STORE_URL must be an http(s) URL");
        }
        if self.auth.key_prefix.is_empty() {
            anyhow::bail!("API_KEY_PREFIX must not be empty");
        }
        if self.sse.keepalive_interval_secs == 0 || self.sse.max_stream_duration_secs == 0 {
            anyhow::bail!("SSE intervals must be non-zero");
        }
        if self.sse.keepalive_interval_secs >= self.sse.max_stream_duration_secs {
            warn!(
                "SSE keep-alive interval ({}s) is not shorter than the stream ceiling ({}s)",
                self.sse.keepalive_interval_secs, self.sse.max_stream_duration_secs
            );
        }
        Ok(())
    }

    /// One-line startup summary; never includes secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "CRM MCP gateway: listen={}:{} env={} data_store={} key_prefix={} timeouts={}s/{}s sse={}s/{}s cors={}",
            self.host,
            self.http_port,
            self.environment,
            self.data_store.url,
            self.auth.key_prefix,
            self.http_client.timeout_secs,
            self.http_client.connect_timeout_secs,
            self.sse.keepalive_interval_secs,
            self.sse.max_stream_duration_secs,
            self.cors.allowed_origins.join(","),
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn required_env(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{key} environment variable is required"))
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Parse comma-separated origins
fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
