//! Configuration management for the Tasks API.
//!
//! Configuration can be set via environment variables (a `.env` file is loaded first
//! when present):
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `READ_TIMEOUT` - Optional. Duration such as `30s` or `1m30s`. Defaults to `30s`.
//! - `WRITE_TIMEOUT` - Optional. Same format. Defaults to `30s`.
//! - `DEBUG` - Optional. Enables verbose logging and `/debug/config`. Defaults to `false`.
//! - `APP_NAME` - Optional. Defaults to `Tasks API`.
//! - `APP_VERSION` - Optional. Defaults to `1.0.0`.
//! - `ENVIRONMENT` - Optional. Defaults to `development`.
//! - `DATABASE_URL` - Required in production.
//! - `JWT_SECRET` - Required in production.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Time allowed for reading a request
    pub read_timeout: Duration,

    /// Time allowed for writing a response
    pub write_timeout: Duration,

    /// Debug mode: verbose logging plus the config dump endpoint
    pub debug: bool,

    /// Service name reported by the health endpoint
    pub app_name: String,

    /// Version reported by the health/version endpoints and the `X-API-Version` header
    pub app_version: String,

    /// Deployment environment ("development", "production", ...)
    pub environment: String,

    /// Database connection string (reserved for a future storage layer)
    pub database_url: Option<String>,

    /// Token signing secret (reserved for future auth)
    pub jwt_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if running in production without
    /// `JWT_SECRET` or `DATABASE_URL`, and `ConfigError::InvalidValue` for a bad `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = get("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let read_timeout = get("READ_TIMEOUT")
            .and_then(|v| parse_duration(&v))
            .unwrap_or(DEFAULT_TIMEOUT);
        let write_timeout = get("WRITE_TIMEOUT")
            .and_then(|v| parse_duration(&v))
            .unwrap_or(DEFAULT_TIMEOUT);

        let debug = get("DEBUG").and_then(|v| parse_bool(&v)).unwrap_or(false);

        let config = Self {
            host,
            port,
            read_timeout,
            write_timeout,
            debug,
            app_name: get("APP_NAME").unwrap_or_else(|| "Tasks API".to_string()),
            app_version: get("APP_VERSION").unwrap_or_else(|| "1.0.0".to_string()),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            database_url: get("DATABASE_URL"),
            jwt_secret: get("JWT_SECRET"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Production deployments must carry their secrets.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() {
            if self.jwt_secret.is_none() {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
            }
            if self.database_url.is_none() {
                return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
            }
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Upper bound on handling a single request (read + write windows).
    pub fn request_timeout(&self) -> Duration {
        self.read_timeout.saturating_add(self.write_timeout)
    }

    /// Bind address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            debug: false,
            app_name: "Tasks API".to_string(),
            app_version: "1.0.0".to_string(),
            environment: "development".to_string(),
            database_url: None,
            jwt_secret: None,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("debug", &self.debug)
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("environment", &self.environment)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parse a duration string like "30s", "1m30s", "200ms", "1.5h".
///
/// Returns `None` for empty, unit-less, unknown-unit or unrepresentable input.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s == "0" {
        return Some(Duration::ZERO);
    }

    let mut total_ms: f64 = 0.0;
    let mut num_buf = String::new();
    let mut chars = s.chars().peekable();

    while chars.peek().is_some() {
        num_buf.clear();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                num_buf.push(c);
                chars.next();
            } else {
                break;
            }
        }

        if num_buf.is_empty() {
            return None;
        }

        let num: f64 = num_buf.parse().ok()?;

        let mut unit = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphabetic() {
                unit.push(c);
                chars.next();
            } else {
                break;
            }
        }

        total_ms += match unit.as_str() {
            "h" => num * 3_600_000.0,
            "m" => num * 60_000.0,
            "s" => num * 1_000.0,
            "ms" => num,
            _ => return None,
        };
    }

    Duration::try_from_secs_f64(total_ms / 1_000.0).ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
