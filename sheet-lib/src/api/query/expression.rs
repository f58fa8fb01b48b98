//! User-facing filter configuration and its compiler.

use serde::Deserialize;
use serde::Serialize;

use super::Filter;
use crate::model::Value;

/// Operator of a single filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equal,
    NotEqual,
    /// Lower bound, inclusive.
    RangeLow,
    /// Upper bound, inclusive.
    RangeHigh,
    /// Prefix match on strings.
    String,
    /// Substring match on strings.
    Fuzzy,
    /// List column contains the value.
    Contains,
    /// Value is one of a list.
    OneOf,
    Empty,
    NotEmpty,
}

impl FilterOperator {
    /// Returns `true` if the operator ignores the condition's value.
    pub fn is_valueless(self) -> bool {
        matches!(self, Self::Empty | Self::NotEmpty)
    }
}

/// One condition of a [`FilterExpression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// The column the condition applies to.
    pub field: String,
    /// The comparison operator.
    pub operator: FilterOperator,
    /// The operand. Ignored by [`FilterOperator::Empty`] and [`FilterOperator::NotEmpty`].
    #[serde(default)]
    pub value: Value,
}

impl FilterCondition {
    /// Creates a new condition.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    fn compile(&self) -> Option<Filter> {
        if self.field.is_empty() {
            return None;
        }
        // Conditions the user has not filled in yet are skipped, not matched
        // against null.
        if !self.operator.is_valueless() && self.value.is_empty() {
            return None;
        }

        let field = self.field.clone();
        let value = self.value.clone();
        let filter = match self.operator {
            FilterOperator::Equal => Filter::Eq(field, value),
            FilterOperator::NotEqual => Filter::Ne(field, value),
            FilterOperator::RangeLow => Filter::Ge(field, value),
            FilterOperator::RangeHigh => Filter::Le(field, value),
            FilterOperator::String => Filter::StartsWith(field, text(value)?),
            FilterOperator::Fuzzy | FilterOperator::Contains => Filter::Contains(field, text(value)?),
            FilterOperator::OneOf => match value {
                Value::List(values) => Filter::OneOf(field, values),
                single => Filter::OneOf(field, vec![single]),
            },
            FilterOperator::Empty => Filter::IsEmpty(field),
            FilterOperator::NotEmpty => Filter::IsNotEmpty(field),
        };
        Some(filter)
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Int(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The filter configuration of a grid: a conjunction of conditions.
///
/// # Example
///
/// ```
/// use sheet_lib::api::query::{Filter, FilterCondition, FilterExpression, FilterOperator};
///
/// let expression = FilterExpression::new()
///     .condition(FilterCondition::new("status", FilterOperator::Equal, "open"))
///     .condition(FilterCondition::new("title", FilterOperator::Fuzzy, ""));
///
/// // The unfilled condition is skipped.
/// assert_eq!(expression.compile(), Some(Filter::eq("status", "open")));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterExpression {
    conditions: Vec<FilterCondition>,
}

impl FilterExpression {
    /// Creates an empty expression (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition (builder pattern).
    pub fn condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Returns the conditions.
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Compiles the expression into the structured query the service understands.
    ///
    /// Returns `None` when no condition is effective.
    pub fn compile(&self) -> Option<Filter> {
        let mut filters: Vec<Filter> = self.conditions.iter().filter_map(FilterCondition::compile).collect();
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::And(filters)),
        }
    }
}

impl FromIterator<FilterCondition> for FilterExpression {
    fn from_iter<I: IntoIterator<Item = FilterCondition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression_compiles_to_none() {
        assert_eq!(FilterExpression::new().compile(), None);
    }

    #[test]
    fn test_multiple_conditions_are_anded() {
        let expression: FilterExpression = [
            FilterCondition::new("priority", FilterOperator::RangeLow, 2),
            FilterCondition::new("notes", FilterOperator::Empty, Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            expression.compile(),
            Some(Filter::and([Filter::ge("priority", 2), Filter::is_empty("notes")]))
        );
    }

    #[test]
    fn test_one_of_accepts_single_value() {
        let expression =
            FilterExpression::new().condition(FilterCondition::new("status", FilterOperator::OneOf, "open"));
        assert_eq!(expression.compile(), Some(Filter::one_of("status", ["open"])));
    }

    #[test]
    fn test_deserialize_expression() {
        let json = r#"[{"field": "name", "operator": "string", "value": "Co"}, {"field": "x", "operator": "notEmpty"}]"#;
        let expression: FilterExpression = serde_json::from_str(json).unwrap();

        assert_eq!(expression.conditions().len(), 2);
        assert_eq!(
            expression.compile(),
            Some(Filter::and([Filter::starts_with("name", "Co"), Filter::is_not_empty("x")]))
        );
    }
}
