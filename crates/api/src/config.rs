//! Application configuration loaded from environment variables.

use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown database provider '{0}', expected 'inmemory' or 'postgres'")]
    UnknownProvider(String),

    #[error("DATABASE_URL is required for the postgres provider")]
    MissingDatabaseUrl,
}

/// Storage backend for to-do items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseProvider {
    InMemory,
    Postgres,
}

impl std::str::FromStr for DatabaseProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inmemory" | "in-memory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub provider: DatabaseProvider,
    pub url: Option<String>,
    pub max_connections: u32,
    pub apply_migrations: bool,
    pub seed_data: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: DatabaseProvider::InMemory,
            url: None,
            max_connections: 5,
            apply_migrations: false,
            seed_data: false,
        }
    }
}

/// Fixed-window limits applied per client address.
///
/// `X-Forwarded-For` is only honoured when the socket peer is loopback or
/// one of `trusted_proxies`.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub permits: u32,
    pub window: Duration,
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            permits: 30,
            window: Duration::from_secs(10),
            trusted_proxies: Vec::new(),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`, `PORT`: bind address (default `0.0.0.0:3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default `text`)
/// - `DATABASE_PROVIDER`: `inmemory` or `postgres` (default `inmemory`)
/// - `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`
/// - `DATABASE_APPLY_MIGRATIONS`, `DATABASE_SEED_DATA`: booleans (default `false`)
/// - `RATE_LIMIT_PERMITS`, `RATE_LIMIT_WINDOW_SECS` (default 30 per 10 s)
/// - `RATE_LIMIT_TRUSTED_PROXIES`: comma separated proxy IPs allowed to set
///   `X-Forwarded-For` (loopback is always trusted)
/// - `REQUEST_TIMEOUT_SECS` (default 30)
/// - `CORS_ALLOWED_ORIGINS`: comma separated origins
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    pub request_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    var(name).and_then(|v| v.trim().parse().ok())
}

fn flag(name: &str) -> bool {
    var(name).is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_proxies(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| match p.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(proxy = %p, "ignoring invalid trusted proxy address");
                None
            }
        })
        .collect()
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let provider = match var("DATABASE_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => defaults.database.provider,
        };
        let url = var("DATABASE_URL");
        if provider == DatabaseProvider::Postgres && url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            database: DatabaseConfig {
                provider,
                url,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                apply_migrations: flag("DATABASE_APPLY_MIGRATIONS"),
                seed_data: flag("DATABASE_SEED_DATA"),
            },
            rate_limit: RateLimitConfig {
                permits: parsed("RATE_LIMIT_PERMITS").unwrap_or(defaults.rate_limit.permits),
                window: parsed("RATE_LIMIT_WINDOW_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.rate_limit.window),
                trusted_proxies: var("RATE_LIMIT_TRUSTED_PROXIES")
                    .map(|raw| split_proxies(&raw))
                    .unwrap_or(defaults.rate_limit.trusted_proxies),
            },
            request_timeout: parsed("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database: DatabaseConfig::default(),
            rate_limit: RateLimitConfig::default(),
            request_timeout: Duration::from_secs(30),
            cors_allowed_origins: split_origins("capacitor://localhost,http://localhost"),
        }
    }
}
