//! Server configuration loaded from environment variables.

use std::str::FromStr;

use dealroom_core::qa;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// A missing or malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Outbound webhook forwarding. Absent when `EVENT_WEBHOOK_URL` is unset.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Event type names to forward.
    pub event_types: Vec<String>,
}

/// Server configuration.
///
/// Everything except the database URL and JWT secret has a default suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background services get to drain after the server stops
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub webhook: Option<WebhookConfig>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                    |
    /// | `DATABASE_URL`           | **required**            |
    /// | `JWT_SECRET`             | **required**            |
    /// | `JWT_ACCESS_EXPIRY_MINS` | `15`                    |
    /// | `EVENT_WEBHOOK_URL`      | unset (disabled)        |
    /// | `EVENT_WEBHOOK_EVENTS`   | `qa_item.answered`      |
    /// | `LOG_FORMAT`             | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&var, "PORT", 3000u16)?;
        let cors_origins = split_list(
            &var("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
        );
        for origin in &cors_origins {
            if let Err(e) = axum::http::HeaderValue::from_str(origin) {
                return Err(ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    value: origin.clone(),
                    reason: e.to_string(),
                });
            }
        }
        let request_timeout_secs = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = parse_or(&var, "SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            access_token_expiry_mins: parse_or(
                &var,
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            )?,
        };

        let webhook = var("EVENT_WEBHOOK_URL").map(|url| WebhookConfig {
            url,
            event_types: split_list(
                &var("EVENT_WEBHOOK_EVENTS").unwrap_or_else(|| qa::events::ANSWERED.into()),
            ),
        });

        let log_format = parse_or(&var, "LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            jwt,
            webhook,
            log_format,
        })
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&'static str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => {
            let parsed: Result<T, T::Err> = value.trim().parse();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
