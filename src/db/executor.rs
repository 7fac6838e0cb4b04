//! Statement execution against a borrowed pooled connection.
//!
//! Every statement string uses the portable `?` placeholder marker for
//! positional arguments. Before execution the marker count is checked
//! against the argument list and the text is translated to the driver's
//! native marker (for MySQL the native marker is also `?`, so the validated
//! text passes through unchanged).
//!
//! Each call leases one connection from the pool for the duration of a
//! single statement; only the explicit-transaction write path holds it
//! across begin, execute and commit/rollback. Connections return to the
//! pool on every path, success or failure.

use futures_util::StreamExt;
use sqlx::mysql::{MySqlPool, MySqlRow};
use tracing::{debug, warn};

use crate::db::params::bind_param;
use crate::db::types::decode_row;
use crate::error::{OrmError, OrmResult};
use crate::model::Record;
use crate::value::Value;

/// Run a read statement and decode the resulting rows.
///
/// `size` caps the number of rows fetched from the cursor; `None` fetches
/// everything. Rows are materialized eagerly.
pub async fn query(
    pool: &MySqlPool,
    sql: &str,
    args: &[Value],
    size: Option<usize>,
) -> OrmResult<Vec<Record>> {
    let sql = to_native_sql(sql, args.len())?;
    debug!(sql = %sql, params = args.len(), "Executing query");

    let mut query = sqlx::query(sql);
    for arg in args {
        query = bind_param(query, arg);
    }

    let rows: Vec<MySqlRow> = match size {
        Some(n) => {
            let results: Vec<Result<MySqlRow, sqlx::Error>> =
                query.fetch(pool).take(n).collect().await;
            let mut rows = Vec::with_capacity(results.len());
            for result in results {
                rows.push(result?);
            }
            rows
        }
        None => query.fetch_all(pool).await?,
    };

    let records: Vec<Record> = rows.iter().map(decode_row).collect();
    debug!(rows = records.len(), "Rows returned");
    Ok(records)
}

/// Run a write statement and return the driver-reported affected-row count.
///
/// With `autocommit` true the statement runs directly on a pooled
/// connection. With `autocommit` false it runs inside an explicit
/// transaction: committed on success, rolled back on failure with the
/// original error re-raised unchanged.
pub async fn execute(
    pool: &MySqlPool,
    sql: &str,
    args: &[Value],
    autocommit: bool,
) -> OrmResult<u64> {
    let sql = to_native_sql(sql, args.len())?;
    debug!(sql = %sql, params = args.len(), autocommit, "Executing write");

    if autocommit {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_param(query, arg);
        }
        let result = query.execute(pool).await?;
        Ok(result.rows_affected())
    } else {
        let mut tx = pool.begin().await?;
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_param(query, arg);
        }
        match query.execute(&mut *tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(OrmError::from(e))
            }
        }
    }
}

/// Validate the placeholder count and translate portable markers to the
/// driver's native marker.
fn to_native_sql<'a>(sql: &'a str, arg_count: usize) -> OrmResult<&'a str> {
    let expected = count_placeholders(sql);
    if expected != arg_count {
        return Err(OrmError::invalid_input(format!(
            "statement expects {expected} bind arguments, got {arg_count}: {sql}"
        )));
    }
    Ok(sql)
}

/// Count `?` markers outside quoted literals and quoted identifiers.
fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_placeholders() {
        assert_eq!(count_placeholders("select `id` from `users`"), 0);
        assert_eq!(
            count_placeholders("insert into `users` (`name`, `id`) values (?, ?)"),
            2
        );
        assert_eq!(
            count_placeholders("update `users` set `name`=? where `id`=?"),
            2
        );
    }

    #[test]
    fn test_count_ignores_quoted_markers() {
        assert_eq!(count_placeholders("select * from t where a = 'what?'"), 0);
        assert_eq!(
            count_placeholders("select `odd?col` from t where a = ? and b = \"?\""),
            1
        );
    }

    #[test]
    fn test_native_sql_argument_mismatch() {
        let args = vec![Value::Int(1)];
        let result = to_native_sql("select * from t where a = ? and b = ?", args.len());
        assert!(matches!(result, Err(OrmError::InvalidInput { .. })));

        let result = to_native_sql("select * from t where a = ?", args.len());
        assert_eq!(result.unwrap(), "select * from t where a = ?");
    }

    #[test]
    fn test_native_sql_empty_args() {
        // A missing argument list is the empty argument list
        assert!(to_native_sql("select 1", 0).is_ok());
    }
}
