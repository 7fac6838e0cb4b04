//! Connection pool management.
//!
//! [`Database`] is an explicit handle around a bounded `sqlx::MySqlPool`.
//! It is created once by [`Database::connect`] and threaded through every
//! call site; independent handles own independent pools, so tests and
//! multi-database processes need no shared global state.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DbConfig;
use crate::db::executor;
use crate::error::OrmResult;
use crate::model::Record;
use crate::value::Value;

/// A pooled database handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: MySqlPool,
    autocommit: bool,
}

impl Database {
    /// Validate the configuration and create the connection pool.
    pub async fn connect(config: &DbConfig) -> OrmResult<Database> {
        config.validate()?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Creating db connection pool"
        );

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .charset(&config.charset);

        let pool = MySqlPoolOptions::new()
            .min_connections(config.pool.min_connections_or_default())
            .max_connections(config.pool.max_connections_or_default())
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_or_default()))
            .idle_timeout(Some(Duration::from_secs(
                config.pool.idle_timeout_or_default(),
            )))
            .connect_with(options)
            .await?;

        Ok(Database {
            pool,
            autocommit: config.autocommit,
        })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Whether writes run without an explicit transaction.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Run a read statement; `size` caps the number of fetched rows.
    pub async fn query(
        &self,
        sql: &str,
        args: &[Value],
        size: Option<usize>,
    ) -> OrmResult<Vec<Record>> {
        executor::query(&self.pool, sql, args, size).await
    }

    /// Run a write statement, returning the affected-row count.
    ///
    /// With `autocommit` false the statement runs inside an explicit
    /// transaction: committed on success, rolled back on failure.
    pub async fn execute(&self, sql: &str, args: &[Value], autocommit: bool) -> OrmResult<u64> {
        executor::execute(&self.pool, sql, args, autocommit).await
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        info!("Closing db connection pool");
        self.pool.close().await;
    }
}
