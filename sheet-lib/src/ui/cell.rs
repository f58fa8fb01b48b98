//! Cell and focus target identifiers

use std::fmt;

use crate::model::RowId;

/// Row component used for the pending new row in textual cell IDs.
pub const NEW_ROW_ID: &str = "new";

/// The row a focus or hover points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// A loaded row.
    Row(RowId),
    /// The row being created, which is not part of the collection yet.
    NewRow,
}

impl FocusTarget {
    /// Returns the row ID, or `None` for the new row.
    pub fn row_id(&self) -> Option<&RowId> {
        match self {
            Self::Row(id) => Some(id),
            Self::NewRow => None,
        }
    }

    /// Returns `true` for the new row.
    pub fn is_new_row(&self) -> bool {
        matches!(self, Self::NewRow)
    }

    fn parse(s: &str) -> Self {
        if s == NEW_ROW_ID {
            Self::NewRow
        } else {
            Self::Row(RowId::new(s))
        }
    }
}

impl From<RowId> for FocusTarget {
    fn from(id: RowId) -> Self {
        Self::Row(id)
    }
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(id) => f.write_str(id.as_str()),
            Self::NewRow => f.write_str(NEW_ROW_ID),
        }
    }
}

/// A cell address: the target row and a column name.
///
/// The textual form is `"{row}-{column}"`. Parsing splits at the first `-`,
/// so row IDs must not contain one while column names may.
///
/// # Example
///
/// ```
/// use sheet_lib::ui::{CellId, FocusTarget};
///
/// let cell = CellId::parse("ro_1-first-name").unwrap();
/// assert_eq!(cell.column, "first-name");
/// assert_eq!(cell.to_string(), "ro_1-first-name");
///
/// assert_eq!(CellId::parse("new-name").unwrap().row, FocusTarget::NewRow);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellId {
    pub row: FocusTarget,
    pub column: String,
}

impl CellId {
    /// Creates a cell ID.
    pub fn new(row: impl Into<FocusTarget>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }

    /// Creates a cell ID in the new row.
    pub fn new_row(column: impl Into<String>) -> Self {
        Self::new(FocusTarget::NewRow, column)
    }

    /// Parses the `"{row}-{column}"` form.
    ///
    /// Returns `None` without a separator or with an empty row component.
    pub fn parse(s: &str) -> Option<Self> {
        let (row, column) = s.split_once('-')?;
        if row.is_empty() {
            return None;
        }
        Some(Self {
            row: FocusTarget::parse(row),
            column: column.to_string(),
        })
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.column)
    }
}
