//! minorm - a minimal async ORM for MySQL.
//!
//! Entity types declare their columns as [`FieldDescriptor`]s; registration
//! produces an immutable [`EntitySchema`] carrying the four canonical
//! statement templates (select, insert, update, delete). CRUD calls run
//! against a pooled [`Database`] handle and bind arguments positionally
//! through the portable `?` placeholder marker.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod schema;
pub mod value;

pub use config::{DbConfig, PoolOptions};
pub use db::Database;
pub use error::{OrmError, OrmResult};
pub use model::{Criteria, Entity, Limit, Record};
pub use schema::{EntitySchema, FieldDescriptor, SchemaBuilder};
pub use value::Value;
