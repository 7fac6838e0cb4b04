//! Entity schema registration and statement synthesis.
//!
//! [`SchemaBuilder`] is called once per entity type. It partitions the
//! declared fields into exactly one primary key and the remaining fields,
//! then synthesizes the four canonical statement templates in declaration
//! order. The resulting [`EntitySchema`] is immutable and shared by every
//! instance of the entity type.

use tracing::debug;

use crate::error::{OrmError, OrmResult};
use crate::schema::field::FieldDescriptor;

/// The immutable mapping and statement-template bundle for one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    table: String,
    primary_key: String,
    pk_column: String,
    fields: Vec<String>,
    mapping: Vec<(String, FieldDescriptor)>,
    select: String,
    insert: String,
    update: String,
    delete: String,
}

impl EntitySchema {
    /// Start registering an entity type.
    pub fn builder(entity: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            entity: entity.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// The entity type name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The primary-key field name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The primary-key column name (override applied, unescaped).
    pub fn pk_column(&self) -> &str {
        &self.pk_column
    }

    /// Non-primary-key field names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Look up the descriptor for a field.
    pub fn descriptor(&self, field: &str) -> Option<&FieldDescriptor> {
        self.mapping
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, descriptor)| descriptor)
    }

    /// All mapped fields with their descriptors, in declaration order.
    pub fn mapping(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.mapping
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// The select-all statement template.
    pub fn select_stmt(&self) -> &str {
        &self.select
    }

    /// The insert statement template (other fields first, primary key last).
    pub fn insert_stmt(&self) -> &str {
        &self.insert
    }

    /// The update-by-primary-key statement template.
    pub fn update_stmt(&self) -> &str {
        &self.update
    }

    /// The delete-by-primary-key statement template.
    pub fn delete_stmt(&self) -> &str {
        &self.delete
    }
}

/// Builder collecting field declarations for one entity type.
pub struct SchemaBuilder {
    entity: String,
    table: Option<String>,
    fields: Vec<(String, FieldDescriptor)>,
}

impl SchemaBuilder {
    /// Override the table name (defaults to the entity type name).
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Declare a field. Declaration order is preserved in every synthesized
    /// statement.
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.push((name.into(), descriptor));
        self
    }

    /// Partition the declared fields and synthesize the statement templates.
    pub fn build(self) -> OrmResult<EntitySchema> {
        let table = self.table.unwrap_or_else(|| self.entity.clone());

        let mut primary_key: Option<String> = None;
        let mut fields: Vec<String> = Vec::new();
        for (name, descriptor) in &self.fields {
            if descriptor.is_primary_key() {
                if primary_key.is_some() {
                    return Err(OrmError::schema(
                        &self.entity,
                        format!("duplicate primary key for field: {name}"),
                    ));
                }
                primary_key = Some(name.clone());
            } else {
                fields.push(name.clone());
            }
        }
        let primary_key =
            primary_key.ok_or_else(|| OrmError::schema(&self.entity, "primary key not found"))?;

        let column_of = |field: &str| -> String {
            self.fields
                .iter()
                .find(|(name, _)| name == field)
                .and_then(|(_, d)| d.column_name())
                .unwrap_or(field)
                .to_string()
        };

        let pk_column = column_of(&primary_key);
        let escaped_pk = escape(&pk_column);
        let escaped_table = escape(&table);
        let escaped_fields: Vec<String> = fields.iter().map(|f| escape(&column_of(f))).collect();

        let select = if escaped_fields.is_empty() {
            format!("select {escaped_pk} from {escaped_table}")
        } else {
            format!(
                "select {escaped_pk}, {} from {escaped_table}",
                escaped_fields.join(", ")
            )
        };

        let mut insert_columns = escaped_fields.clone();
        insert_columns.push(escaped_pk.clone());
        let insert = format!(
            "insert into {escaped_table} ({}) values ({})",
            insert_columns.join(", "),
            placeholders(insert_columns.len())
        );

        let set_clause: Vec<String> = escaped_fields.iter().map(|f| format!("{f}=?")).collect();
        let update = format!(
            "update {escaped_table} set {} where {escaped_pk}=?",
            set_clause.join(", ")
        );

        let delete = format!("delete from {escaped_table} where {escaped_pk}=?");

        debug!(
            entity = %self.entity,
            table = %table,
            primary_key = %primary_key,
            fields = fields.len(),
            "Registered entity schema"
        );

        Ok(EntitySchema {
            entity: self.entity,
            table,
            primary_key,
            pk_column,
            fields,
            mapping: self.fields,
            select,
            insert,
            update,
            delete,
        })
    }
}

fn escape(identifier: &str) -> String {
    format!("`{identifier}`")
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
