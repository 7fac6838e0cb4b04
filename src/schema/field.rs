//! Column descriptors.
//!
//! A [`FieldDescriptor`] describes one mapped column: an optional column
//! name override, a storage type tag, the primary-key flag and a static
//! default value. Pure value holder; immutable once the owning schema is
//! built.

use std::fmt;

use crate::value::Value;

/// Metadata for one mapped column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    kind: &'static str,
    name: Option<String>,
    column_type: String,
    primary_key: bool,
    default: Value,
}

impl FieldDescriptor {
    fn with(kind: &'static str, column_type: &str, default: Value) -> Self {
        Self {
            kind,
            name: None,
            column_type: column_type.to_string(),
            primary_key: false,
            default,
        }
    }

    /// String column, `varchar(100)` by default.
    pub fn string() -> Self {
        Self::with("StringField", "varchar(100)", Value::Null)
    }

    /// Integer column, `bigint`, default 0.
    pub fn integer() -> Self {
        Self::with("IntegerField", "bigint", Value::Int(0))
    }

    /// Boolean column, default false.
    pub fn boolean() -> Self {
        Self::with("BooleanField", "boolean", Value::Bool(false))
    }

    /// Floating point column, `real`, default 0.0.
    pub fn float() -> Self {
        Self::with("FloatField", "real", Value::Float(0.0))
    }

    /// Text column, no default.
    pub fn text() -> Self {
        Self::with("TextField", "text", Value::Null)
    }

    /// Mark this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Override the column name (defaults to the declared field name).
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the storage type tag.
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = column_type.into();
        self
    }

    /// Set the static default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// The column name override, if any.
    pub fn column_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The storage type tag, e.g. `varchar(100)`.
    pub fn storage_type(&self) -> &str {
        &self.column_type
    }

    /// Whether this field is the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// The static default value.
    pub fn default(&self) -> &Value {
        &self.default
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{},{},{}>",
            self.kind,
            self.column_type,
            self.name.as_deref().unwrap_or("-")
        )
    }
}
