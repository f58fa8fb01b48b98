//! Structured filter predicates.

use std::cmp::Ordering;

use crate::model::ID_FIELD;
use crate::model::Record;
use crate::model::RowId;
use crate::model::Value;

/// A filter condition for searching rows.
///
/// Filters can be combined using logical operators (`And`, `Or`) to build
/// complex conditions.
///
/// # Example
///
/// ```
/// use sheet_lib::api::query::Filter;
///
/// // Simple equality filter
/// let filter = Filter::eq("status", "open");
///
/// // Combined filter
/// let filter = Filter::and([
///     Filter::eq("status", "open"),
///     Filter::gt("priority", 2),
/// ]);
///
/// // Single row by ID
/// let filter = Filter::id("ro_123");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality: `field == value`
    Eq(String, Value),
    /// Not equal: `field != value`
    Ne(String, Value),
    /// Greater than: `field > value`
    Gt(String, Value),
    /// Greater than or equal: `field >= value`
    Ge(String, Value),
    /// Less than: `field < value`
    Lt(String, Value),
    /// Less than or equal: `field <= value`
    Le(String, Value),
    /// Case-insensitive substring match, or list membership for list fields.
    Contains(String, String),
    /// Case-insensitive prefix match.
    StartsWith(String, String),
    /// Field equals one of the given values.
    OneOf(String, Vec<Value>),
    /// Field is null or empty.
    IsEmpty(String),
    /// Field is neither null nor empty.
    IsNotEmpty(String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter on the row identity.
    pub fn id(id: impl Into<RowId>) -> Self {
        Filter::Eq(ID_FIELD.to_string(), Value::String(id.into().as_str().to_string()))
    }

    /// Creates an equality filter: `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a not-equal filter: `field != value`.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Creates a greater-than filter: `field > value`.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter: `field >= value`.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    /// Creates a less-than filter: `field < value`.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter: `field <= value`.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    /// Creates a contains filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    /// Creates a starts-with filter.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::StartsWith(field.into(), value.into())
    }

    /// Creates a one-of filter.
    pub fn one_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::OneOf(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates an is-empty filter.
    pub fn is_empty(field: impl Into<String>) -> Self {
        Filter::IsEmpty(field.into())
    }

    /// Creates an is-not-empty filter.
    pub fn is_not_empty(field: impl Into<String>) -> Self {
        Filter::IsNotEmpty(field.into())
    }

    /// Creates a logical AND of multiple filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Creates a logical OR of multiple filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using logical AND.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Evaluates the filter against a record.
    ///
    /// Missing fields read as null. `_id` addresses the record identity.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Eq(field, value) => field_value(record, field) == *value,
            Filter::Ne(field, value) => field_value(record, field) != *value,
            Filter::Gt(field, value) => compare(record, field, value) == Some(Ordering::Greater),
            Filter::Ge(field, value) => matches!(
                compare(record, field, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Filter::Lt(field, value) => compare(record, field, value) == Some(Ordering::Less),
            Filter::Le(field, value) => matches!(
                compare(record, field, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Filter::Contains(field, needle) => match field_value(record, field) {
                Value::String(s) => s.to_lowercase().contains(&needle.to_lowercase()),
                Value::List(items) => items.iter().any(|item| item.as_str() == Some(needle.as_str())),
                _ => false,
            },
            Filter::StartsWith(field, prefix) => field_value(record, field)
                .as_str()
                .is_some_and(|s| s.to_lowercase().starts_with(&prefix.to_lowercase())),
            Filter::OneOf(field, values) => {
                let value = field_value(record, field);
                values.contains(&value)
            }
            Filter::IsEmpty(field) => field_value(record, field).is_empty(),
            Filter::IsNotEmpty(field) => !field_value(record, field).is_empty(),
            Filter::And(filters) => filters.iter().all(|f| f.matches(record)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }
}

fn field_value(record: &Record, field: &str) -> Value {
    if field == ID_FIELD {
        return Value::String(record.id().as_str().to_string());
    }
    record.get(field).cloned().unwrap_or_default()
}

fn compare(record: &Record, field: &str, value: &Value) -> Option<Ordering> {
    field_value(record, field).compare(value)
}
