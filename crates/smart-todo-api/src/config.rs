//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/smart_todo` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8000` |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000,http://127.0.0.1:3000` |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_REQUESTS` | `100` |
//! | `RATE_LIMIT_PERIOD_SECS` | `60` |

use axum::http::HeaderValue;
use tracing::warn;

use smart_todo_core::defaults;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/smart_todo";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u64,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests: defaults::RATE_LIMIT_REQUESTS,
            period_secs: defaults::RATE_LIMIT_PERIOD_SECS,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: parse_allowed_origins(defaults::ALLOWED_ORIGINS),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let fallback = Self::default();
        let rate_limit = RateLimitConfig {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            requests: env_parse("RATE_LIMIT_REQUESTS", defaults::RATE_LIMIT_REQUESTS),
            period_secs: env_parse("RATE_LIMIT_PERIOD_SECS", defaults::RATE_LIMIT_PERIOD_SECS),
        };

        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(fallback.database_url),
            host: std::env::var("HOST").unwrap_or(fallback.host),
            port: env_parse("PORT", defaults::SERVER_PORT),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_allowed_origins(&raw))
                .unwrap_or(fallback.allowed_origins),
            rate_limit,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a comma-separated origin whitelist. Blank input falls back to the
/// development defaults; entries that are not valid header values are
/// skipped with a warning.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let source = if raw.trim().is_empty() {
        defaults::ALLOWED_ORIGINS
    } else {
        raw
    };

    source
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
