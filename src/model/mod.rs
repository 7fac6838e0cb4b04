//! Entity mapping and the CRUD surface.
//!
//! An [`Entity`] is a record-backed type tied to a `'static`
//! [`EntitySchema`]. The CRUD operations live on [`Database`] and work for
//! any entity type: statement templates come from the schema, arguments are
//! assembled in field-declaration order, and fetched rows are materialized
//! eagerly through `Entity::from_record`.

mod criteria;
mod record;

pub use criteria::{Criteria, Limit};
pub use record::Record;

use tracing::{debug, warn};

use crate::db::executor;
use crate::db::pool::Database;
use crate::error::OrmResult;
use crate::schema::EntitySchema;
use crate::value::Value;

/// A record-backed entity type mapped to one table.
pub trait Entity: Sized {
    /// The shared, registration-time schema for this entity type.
    fn schema() -> &'static EntitySchema;

    /// Materialize an instance from a fetched row.
    fn from_record(record: Record) -> Self;

    /// The backing record.
    fn record(&self) -> &Record;

    /// The backing record, mutably.
    fn record_mut(&mut self) -> &mut Record;

    /// Read a field. `None` means the field was never set, distinct from a
    /// field set to null.
    fn value(&self, field: &str) -> Option<&Value> {
        self.record().get(field)
    }

    /// Set a field.
    fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.record_mut().insert(field, value);
    }

    /// Read a field, falling back to the descriptor's static default when
    /// the field is unset or null. The default is written back onto the
    /// instance so subsequent reads see the same value.
    fn value_or_default(&mut self, field: &str) -> Value {
        if let Some(value) = self.record().get(field) {
            if !value.is_null() {
                return value.clone();
            }
        }
        let default = Self::schema()
            .descriptor(field)
            .map(|descriptor| descriptor.default().clone())
            .unwrap_or(Value::Null);
        if !default.is_null() {
            debug!(field, default = ?default, "Using default value");
            self.record_mut().insert(field, default.clone());
        }
        default
    }
}

impl Database {
    /// Find all rows matching the criteria, mapped into entity instances.
    pub async fn find_all<E: Entity>(&self, criteria: Criteria) -> OrmResult<Vec<E>> {
        let (sql, args) = build_select(E::schema(), &criteria);
        let rows = executor::query(self.pool(), &sql, &args, None).await?;
        Ok(rows.into_iter().map(E::from_record).collect())
    }

    /// Find one row by primary key.
    pub async fn find<E: Entity>(&self, pk: impl Into<Value>) -> OrmResult<Option<E>> {
        let schema = E::schema();
        let sql = format!("{} where `{}`=?", schema.select_stmt(), schema.pk_column());
        let rows = executor::query(self.pool(), &sql, &[pk.into()], Some(1)).await?;
        Ok(rows.into_iter().next().map(E::from_record))
    }

    /// Evaluate a select expression (e.g. `count(*)`) over the entity's
    /// table. Returns `None` only when the row set itself is empty; an
    /// aggregate yielding 0 comes back as `Some(Value::Int(0))`.
    pub async fn find_number<E: Entity>(
        &self,
        select_expr: &str,
        where_clause: Option<&str>,
        args: &[Value],
    ) -> OrmResult<Option<Value>> {
        let schema = E::schema();
        let mut sql = format!("select {select_expr} as _num_ from `{}`", schema.table());
        if let Some(clause) = where_clause {
            sql.push_str(" where ");
            sql.push_str(clause);
        }
        let rows = executor::query(self.pool(), &sql, args, Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.get("_num_").cloned().unwrap_or(Value::Null)))
    }

    /// Insert the entity. Unset fields are backfilled with their descriptor
    /// defaults before the write; the primary key binds last.
    pub async fn save<E: Entity>(&self, entity: &mut E) -> OrmResult<()> {
        let schema = E::schema();
        let args = insert_args(entity);
        let affected =
            executor::execute(self.pool(), schema.insert_stmt(), &args, self.autocommit()).await?;
        if affected != 1 {
            warn!(
                entity = schema.entity(),
                affected, "failed to insert record: unexpected affected rows"
            );
        }
        Ok(())
    }

    /// Update the entity's row by primary key with its current field values.
    pub async fn update<E: Entity>(&self, entity: &E) -> OrmResult<()> {
        let schema = E::schema();
        let args = update_args(entity);
        let affected =
            executor::execute(self.pool(), schema.update_stmt(), &args, self.autocommit()).await?;
        if affected != 1 {
            warn!(
                entity = schema.entity(),
                affected, "failed to update by primary key: unexpected affected rows"
            );
        }
        Ok(())
    }

    /// Delete the entity's row by primary key.
    pub async fn remove<E: Entity>(&self, entity: &E) -> OrmResult<()> {
        let schema = E::schema();
        let pk = entity
            .value(schema.primary_key())
            .cloned()
            .unwrap_or(Value::Null);
        let affected =
            executor::execute(self.pool(), schema.delete_stmt(), &[pk], self.autocommit()).await?;
        if affected != 1 {
            warn!(
                entity = schema.entity(),
                affected, "failed to remove by primary key: unexpected affected rows"
            );
        }
        Ok(())
    }
}

/// Assemble the select statement and argument list for the criteria.
fn build_select(schema: &EntitySchema, criteria: &Criteria) -> (String, Vec<Value>) {
    let mut sql = schema.select_stmt().to_string();
    let mut args: Vec<Value> = criteria.bind_args().to_vec();

    if let Some(clause) = criteria.filter_clause() {
        sql.push_str(" where ");
        sql.push_str(clause);
    }
    if let Some(clause) = criteria.order_clause() {
        sql.push_str(" order by ");
        sql.push_str(clause);
    }
    match criteria.row_limit() {
        None => {}
        Some(Limit::Count(count)) => {
            sql.push_str(" limit ?");
            args.push(Value::Int(*count as i64));
        }
        Some(Limit::OffsetCount(offset, count)) => {
            sql.push_str(" limit ?, ?");
            args.push(Value::Int(*offset as i64));
            args.push(Value::Int(*count as i64));
        }
    }

    (sql, args)
}

/// Insert arguments: other fields in declaration order (defaults
/// backfilled), primary key last, matching the insert template.
fn insert_args<E: Entity>(entity: &mut E) -> Vec<Value> {
    let schema = E::schema();
    let mut args = Vec::with_capacity(schema.fields().len() + 1);
    for field in schema.fields() {
        args.push(entity.value_or_default(field));
    }
    args.push(entity.value_or_default(schema.primary_key()));
    args
}

/// Update arguments: current field values in declaration order (null when
/// unset), primary key last, matching the update template's set list.
fn update_args<E: Entity>(entity: &E) -> Vec<Value> {
    let schema = E::schema();
    let mut args = Vec::with_capacity(schema.fields().len() + 1);
    for field in schema.fields() {
        args.push(entity.value(field).cloned().unwrap_or(Value::Null));
    }
    args.push(
        entity
            .value(schema.primary_key())
            .cloned()
            .unwrap_or(Value::Null),
    );
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntitySchema, FieldDescriptor};
    use std::sync::LazyLock;

    static USER_SCHEMA: LazyLock<EntitySchema> = LazyLock::new(|| {
        EntitySchema::builder("User")
            .table("users")
            .field("id", FieldDescriptor::integer().primary_key())
            .field("name", FieldDescriptor::string())
            .build()
            .expect("valid user schema")
    });

    struct User {
        record: Record,
    }

    impl User {
        fn new() -> Self {
            User {
                record: Record::new(),
            }
        }
    }

    impl Entity for User {
        fn schema() -> &'static EntitySchema {
            &USER_SCHEMA
        }

        fn from_record(record: Record) -> Self {
            User { record }
        }

        fn record(&self) -> &Record {
            &self.record
        }

        fn record_mut(&mut self) -> &mut Record {
            &mut self.record
        }
    }

    #[test]
    fn test_insert_args_order_and_backfill() {
        let mut user = User::new();
        user.set("name", "liufu");

        // Other fields first, primary key last; unset id takes its default
        let args = insert_args(&mut user);
        assert_eq!(args, vec![Value::from("liufu"), Value::Int(0)]);

        // The backfilled default is now visible on the instance
        assert_eq!(user.value("id"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_value_or_default_reuses_backfilled_value() {
        let mut user = User::new();
        assert_eq!(user.value("id"), None);

        assert_eq!(user.value_or_default("id"), Value::Int(0));
        assert_eq!(user.value("id"), Some(&Value::Int(0)));
        assert_eq!(user.value_or_default("id"), Value::Int(0));
    }

    #[test]
    fn test_value_or_default_without_default_stays_unset() {
        let mut user = User::new();
        // StringField has no default; nothing is written back
        assert_eq!(user.value_or_default("name"), Value::Null);
        assert_eq!(user.value("name"), None);
    }

    #[test]
    fn test_update_args_do_not_backfill() {
        let mut user = User::new();
        user.set("id", 7i64);

        let args = update_args(&user);
        assert_eq!(args, vec![Value::Null, Value::Int(7)]);
        assert_eq!(user.value("name"), None);
    }

    #[test]
    fn test_build_select_plain() {
        let (sql, args) = build_select(&USER_SCHEMA, &Criteria::new());
        assert_eq!(sql, "select `id`, `name` from `users`");
        assert!(args.is_empty());
    }

    #[test]
    fn test_build_select_full() {
        let criteria = Criteria::new()
            .filter("`name`=?")
            .arg("liufu")
            .order_by("`id` desc")
            .limit(Limit::Count(5));
        let (sql, args) = build_select(&USER_SCHEMA, &criteria);
        assert_eq!(
            sql,
            "select `id`, `name` from `users` where `name`=? order by `id` desc limit ?"
        );
        assert_eq!(args, vec![Value::from("liufu"), Value::Int(5)]);
    }

    #[test]
    fn test_build_select_offset_count_binds_two_args() {
        let criteria = Criteria::new().limit(Limit::OffsetCount(10, 5));
        let (sql, args) = build_select(&USER_SCHEMA, &criteria);
        assert_eq!(sql, "select `id`, `name` from `users` limit ?, ?");
        assert_eq!(args, vec![Value::Int(10), Value::Int(5)]);
    }
}
