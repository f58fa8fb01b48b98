//! Outcome of single-row reconciliation

use crate::model::Row;
use crate::model::RowId;

/// What [`RowStore::refresh_row`](super::RowStore::refresh_row) did locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// The row was present and has been replaced in place.
    Updated(Row),
    /// The row was not loaded and has been appended.
    Inserted(Row),
    /// The row no longer exists on the server and has been removed.
    Removed(RowId),
    /// Nothing changed locally.
    Unchanged,
}

impl Reconciled {
    /// Returns the local row after reconciliation, if it exists.
    pub fn row(&self) -> Option<&Row> {
        match self {
            Self::Updated(row) | Self::Inserted(row) => Some(row),
            Self::Removed(_) | Self::Unchanged => None,
        }
    }

    /// Returns `true` if the row collection changed.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}
