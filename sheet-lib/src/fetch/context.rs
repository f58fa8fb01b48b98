//! The (datasource, filter) pair scoping pagination

use serde::Deserialize;
use serde::Serialize;

use crate::api::query::FilterExpression;
use crate::model::TableId;

/// The external configuration a grid is synchronized against.
///
/// Changing either field invalidates every loaded row and restarts pagination
/// from the first page. A context without a datasource loads nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchContext {
    /// The table to load rows from.
    pub datasource_id: Option<TableId>,
    /// The filter applied to every page.
    #[serde(default)]
    pub filter: FilterExpression,
}

impl FetchContext {
    /// Creates an unfiltered context for a table.
    pub fn new(table: impl Into<TableId>) -> Self {
        Self {
            datasource_id: Some(table.into()),
            filter: FilterExpression::default(),
        }
    }

    /// Creates a context with no datasource.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the filter (builder pattern).
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = filter;
        self
    }
}

/// Identifies one configured fetch context.
///
/// Every asynchronous continuation captures the token that was current when it
/// started and is discarded if the token changed in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContextToken(u64);

impl ContextToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ContextToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
