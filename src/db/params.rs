//! Parameter binding for MySQL statements.

use sqlx::MySql;
use sqlx::mysql::MySqlArguments;

use crate::value::Value;

/// Bind a positional parameter to a MySQL query.
pub(crate) fn bind_param<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &'q Value,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::String(v) => query.bind(v.as_str()),
        Value::Bytes(v) => query.bind(v.as_slice()),
    }
}
