/// Configuration management for Social Service
///
/// Loads configuration from environment variables (and `.env` when present).
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// PostgreSQL; `None` selects the in-memory repository
    pub database: Option<DatabaseConfig>,
    /// Token verification
    pub auth: AuthConfig,
    /// Feed paging limits
    pub feed: FeedConfig,
    /// JSON fixture loaded into the in-memory repository
    pub seed_file: Option<PathBuf>,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// RSA public key used to verify access tokens
    pub jwt_public_key_pem: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_public_key_pem", &self.jwt_public_key_pem.as_ref().map(|_| "<set>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    /// Page size when the request names none
    pub default_limit: usize,
    /// Upper bound on any requested page size
    pub max_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: default_feed_limit(),
            max_limit: default_feed_max_limit(),
        }
    }
}

impl FeedConfig {
    /// Clamp a requested page size into `1..=max_limit`
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_feed_limit() -> usize {
    50
}

fn default_feed_max_limit() -> usize {
    200
}

/// Read `name`, falling back to `default` when unset; malformed values are errors
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8006)?,
            json_logs: env_opt("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        };

        let database = match env_opt("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: env_or("DB_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: env_or("DB_MIN_CONNECTIONS", default_min_connections())?,
            }),
            None => None,
        };

        // PEM keys are often passed with escaped newlines
        let auth = AuthConfig {
            jwt_public_key_pem: env_opt("JWT_PUBLIC_KEY_PEM").map(|pem| pem.replace("\\n", "\n")),
        };

        let feed = FeedConfig {
            default_limit: env_or("FEED_DEFAULT_LIMIT", default_feed_limit())?,
            max_limit: env_or("FEED_MAX_LIMIT", default_feed_max_limit())?,
        };
        if feed.default_limit == 0 || feed.default_limit > feed.max_limit {
            anyhow::bail!(
                "FEED_DEFAULT_LIMIT ({}) must be between 1 and FEED_MAX_LIMIT ({})",
                feed.default_limit,
                feed.max_limit
            );
        }

        Ok(Config {
            app,
            database,
            auth,
            feed,
            seed_file: env_opt("SEED_FILE").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "APP_HOST",
        "PORT",
        "LOG_FORMAT",
        "DATABASE_URL",
        "DB_MAX_CONNECTIONS",
        "DB_MIN_CONNECTIONS",
        "JWT_PUBLIC_KEY_PEM",
        "FEED_DEFAULT_LIMIT",
        "FEED_MAX_LIMIT",
        "SEED_FILE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_values() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8006);
        assert!(!config.app.json_logs);
        assert!(config.database.is_none());
        assert!(config.auth.jwt_public_key_pem.is_none());
        assert_eq!(config.feed, FeedConfig::default());
        assert!(config.seed_file.is_none());
    }

    #[test]
    #[serial]
    fn test_database_and_key_from_env() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("DB_MAX_CONNECTIONS", "7");
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----");
        std::env::set_var("LOG_FORMAT", "JSON");

        let config = Config::from_env().unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://test");
        assert_eq!(database.max_connections, 7);
        assert_eq!(database.min_connections, 5);
        assert_eq!(
            config.auth.jwt_public_key_pem.as_deref(),
            Some("-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----")
        );
        assert!(config.app.json_logs);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_values_are_rejected() {
        clear_env();
        std::env::set_var("PORT", "eighty");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("FEED_DEFAULT_LIMIT", "500");
        std::env::set_var("FEED_MAX_LIMIT", "100");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_page_size_clamps() {
        let feed = FeedConfig {
            default_limit: 20,
            max_limit: 100,
        };
        assert_eq!(feed.page_size(None), 20);
        assert_eq!(feed.page_size(Some(0)), 1);
        assert_eq!(feed.page_size(Some(40)), 40);
        assert_eq!(feed.page_size(Some(10_000)), 100);
    }
}
