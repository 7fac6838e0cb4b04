//! Declarative entity schemas.
//!
//! Field declarations ([`field`]) are registered once per entity type
//! ([`registry`]), producing an immutable schema with synthesized statement
//! templates.

pub mod field;
pub mod registry;

pub use field::FieldDescriptor;
pub use registry::{EntitySchema, SchemaBuilder};
