//! Read-query refinement: where clause, ordering, row limit.

use serde_json::Value as JsonValue;

use crate::error::OrmError;
use crate::value::Value;

/// Row limit for `find_all`: either a plain count or an offset/count pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    OffsetCount(u64, u64),
}

/// Accept a dynamic limit shape from a JSON-speaking caller: an integer or
/// a two-element array. Anything else is rejected.
impl TryFrom<&JsonValue> for Limit {
    type Error = OrmError;

    fn try_from(value: &JsonValue) -> Result<Self, OrmError> {
        match value {
            JsonValue::Number(n) => match n.as_u64() {
                Some(count) => Ok(Limit::Count(count)),
                None => Err(OrmError::invalid_input(format!(
                    "Invalid limit value: {value}"
                ))),
            },
            JsonValue::Array(items) if items.len() == 2 => {
                match (items[0].as_u64(), items[1].as_u64()) {
                    (Some(offset), Some(count)) => Ok(Limit::OffsetCount(offset, count)),
                    _ => Err(OrmError::invalid_input(format!(
                        "Invalid limit value: {value}"
                    ))),
                }
            }
            _ => Err(OrmError::invalid_input(format!(
                "Invalid limit value: {value}"
            ))),
        }
    }
}

/// Optional refinements for a select: where clause with positional args,
/// order-by clause, and a row limit.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    filter: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl Criteria {
    /// Create an empty criteria set (select everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the where clause (without the `where` keyword), e.g. `` `email`=? ``.
    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.filter = Some(clause.into());
        self
    }

    /// Append one positional argument for the where clause.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set the order-by clause (without the `order by` keywords).
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    /// Cap the result rows.
    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn filter_clause(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub(crate) fn bind_args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn order_clause(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub(crate) fn row_limit(&self) -> Option<&Limit> {
        self.limit.as_ref()
    }
}
