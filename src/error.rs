//! Error types for minorm.
//!
//! All error variants are defined with `thiserror`. Not-found is a normal
//! outcome (`Ok(None)`), never an error; rollback inside the executor is the
//! only local recovery, every other failure propagates to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("Schema error for entity '{entity}': {message}")]
    Schema { entity: String, message: String },

    #[error("Missing required config field: {field}")]
    Config { field: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "23000" for a duplicate key
        code: Option<String>,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl OrmError {
    /// Create a schema registration error.
    pub fn schema(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create a missing-config-field error.
    pub fn config(field: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a database error with optional driver code.
    pub fn database(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            code,
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Convert sqlx errors to OrmError.
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => OrmError::connection(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                OrmError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => OrmError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => OrmError::timeout("connection pool acquire", 30),
            sqlx::Error::PoolClosed => OrmError::connection("Connection pool is closed"),
            sqlx::Error::Io(io_err) => OrmError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => OrmError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => OrmError::connection(format!("Protocol error: {}", msg)),
            sqlx::Error::ColumnNotFound(col) => {
                OrmError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => OrmError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                OrmError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => OrmError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => OrmError::internal("Database worker crashed"),
            _ => OrmError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for data-access operations.
pub type OrmResult<T> = Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrmError::schema("User", "primary key not found");
        assert!(err.to_string().contains("Schema error for entity 'User'"));

        let err = OrmError::config("user");
        assert_eq!(err.to_string(), "Missing required config field: user");
    }

    #[test]
    fn test_error_retryable() {
        assert!(OrmError::timeout("query", 30).is_retryable());
        assert!(OrmError::connection("refused").is_retryable());
        assert!(!OrmError::schema("User", "dup").is_retryable());
        assert!(!OrmError::invalid_input("bad limit").is_retryable());
    }

    #[test]
    fn test_pool_timeout_conversion() {
        let err: OrmError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, OrmError::Timeout { .. }));
    }

    #[test]
    fn test_row_not_found_conversion() {
        let err: OrmError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, OrmError::Database { .. }));
    }
}
