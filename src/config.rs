//! Pool and connection configuration.
//!
//! [`DbConfig`] is the initialization contract consumed from the caller or a
//! config loader: `user`, `password` and `database` are required, everything
//! else falls back to a default. [`PoolOptions`] bounds the connection pool
//! and puts a timeout on borrow operations so an exhausted pool fails fast
//! instead of suspending the caller forever.

use serde::Deserialize;

use crate::error::{OrmError, OrmResult};

/// Default maximum connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default minimum connections kept alive in the pool.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default connection acquire timeout in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Connection pool tuning options. All fields are optional; accessors apply
/// the documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in pool (default: 10)
    pub max_connections: Option<u32>,
    /// Minimum connections in pool (default: 1)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
}

impl PoolOptions {
    /// Get max_connections with default value.
    pub fn max_connections_or_default(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Get min_connections with default value.
    pub fn min_connections_or_default(&self) -> u32 {
        self.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS)
    }

    /// Get acquire_timeout with default value.
    pub fn acquire_timeout_or_default(&self) -> u64 {
        self.acquire_timeout_secs
            .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS)
    }

    /// Get idle_timeout with default value.
    pub fn idle_timeout_or_default(&self) -> u64 {
        self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS)
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    /// Server host (default: "localhost")
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3306)
    #[serde(default = "default_port")]
    pub port: u16,
    /// User name (required)
    #[serde(default)]
    pub user: String,
    /// Password (required)
    #[serde(default)]
    pub password: String,
    /// Database name (required)
    #[serde(default, alias = "db")]
    pub database: String,
    /// Connection charset (default: "utf8")
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Run writes without an explicit transaction (default: true)
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    /// Pool tuning options
    #[serde(default)]
    pub pool: PoolOptions,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_autocommit() -> bool {
    true
}

impl DbConfig {
    /// Create a config from the three required fields, defaults elsewhere.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            pool: PoolOptions::default(),
        }
    }

    /// Verify that every required field is present.
    pub fn validate(&self) -> OrmResult<()> {
        if self.user.is_empty() {
            return Err(OrmError::config("user"));
        }
        if self.password.is_empty() {
            return Err(OrmError::config("password"));
        }
        if self.database.is_empty() {
            return Err(OrmError::config("database"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DbConfig::new("www-data", "www-data", "awesome");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.charset, "utf8");
        assert!(config.autocommit);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let config = DbConfig::new("", "pass", "db");
        assert!(matches!(
            config.validate(),
            Err(OrmError::Config { field }) if field == "user"
        ));

        let config = DbConfig::new("user", "", "db");
        assert!(matches!(
            config.validate(),
            Err(OrmError::Config { field }) if field == "password"
        ));

        let config = DbConfig::new("user", "pass", "");
        assert!(matches!(
            config.validate(),
            Err(OrmError::Config { field }) if field == "database"
        ));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: DbConfig =
            serde_json::from_str(r#"{"user":"root","password":"root","db":"test"}"#).unwrap();
        assert_eq!(config.database, "test");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_missing_required_is_caught_by_validate() {
        let config: DbConfig = serde_json::from_str(r#"{"user":"root"}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OrmError::Config { field }) if field == "password"
        ));
    }

    #[test]
    fn test_pool_option_defaults() {
        let options = PoolOptions::default();
        assert_eq!(options.max_connections_or_default(), DEFAULT_MAX_CONNECTIONS);
        assert_eq!(options.min_connections_or_default(), DEFAULT_MIN_CONNECTIONS);
        assert_eq!(
            options.acquire_timeout_or_default(),
            DEFAULT_ACQUIRE_TIMEOUT_SECS
        );

        let options = PoolOptions {
            max_connections: Some(3),
            ..PoolOptions::default()
        };
        assert_eq!(options.max_connections_or_default(), 3);
    }
}
