//! Ordered row collection with an id lookup index

use std::collections::HashMap;
use std::collections::HashSet;

use super::Record;
use super::Row;
use super::RowId;

/// The grid's ordered row collection.
///
/// Every structural mutation re-derives each row's `position` and the
/// id → index lookup before returning, so readers never observe a row whose
/// position disagrees with its slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
    lookup: HashMap<RowId, usize>,
}

impl RowSet {
    /// Creates an empty row set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows in order.
    pub fn as_slice(&self) -> &[Row] {
        &self.rows
    }

    /// Iterates over the rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the row at the given position.
    pub fn get(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Returns the row with the given ID.
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.index_of(id).and_then(|idx| self.rows.get(idx))
    }

    /// Returns the position of the row with the given ID.
    pub fn index_of(&self, id: &RowId) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Returns `true` if a row with the given ID is present.
    pub fn contains(&self, id: &RowId) -> bool {
        self.lookup.contains_key(id)
    }

    /// Appends records at the end. Callers are responsible for deduplication.
    pub(crate) fn append(&mut self, records: impl IntoIterator<Item = Record>) -> Vec<Row> {
        let start = self.rows.len();
        for record in records {
            let position = self.rows.len();
            self.lookup.insert(record.id().clone(), position);
            self.rows.push(record.into_row(position));
        }
        self.rows[start..].to_vec()
    }

    /// Replaces the row in place, keeping its position.
    pub(crate) fn replace(&mut self, record: Record) -> Option<Row> {
        let idx = self.index_of(record.id())?;
        self.rows[idx] = record.into_row(idx);
        Some(self.rows[idx].clone())
    }

    /// Returns a mutable reference to the row with the given ID.
    ///
    /// Only non-structural edits (cell values) are allowed through this.
    pub(crate) fn row_mut(&mut self, id: &RowId) -> Option<&mut Row> {
        let idx = self.index_of(id)?;
        self.rows.get_mut(idx)
    }

    /// Removes every row whose ID is in `ids`. Returns the number removed.
    pub(crate) fn remove(&mut self, ids: &HashSet<RowId>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !ids.contains(row.id()));
        let removed = before - self.rows.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    /// Removes all rows.
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.lookup.clear();
    }

    fn reindex(&mut self) {
        self.lookup.clear();
        for (idx, row) in self.rows.iter_mut().enumerate() {
            row.set_position(idx);
            self.lookup.insert(row.id().clone(), idx);
        }
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
