//! Set of row IDs already appended to the collection

use std::collections::HashSet;

use crate::model::RowId;

/// Remembers which row IDs have been appended during the current fetch context.
///
/// Only the append path consults it. It lives exactly as long as one fetch
/// context and is reset whenever the datasource or filter changes.
#[derive(Debug, Clone, Default)]
pub struct IdentityCache {
    seen: HashSet<RowId>,
}

impl IdentityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the ID has been appended before.
    pub fn has(&self, id: &RowId) -> bool {
        self.seen.contains(id)
    }

    /// Marks an ID as appended. Returns `true` if it was not seen before.
    pub fn mark_seen(&mut self, id: RowId) -> bool {
        self.seen.insert(id)
    }

    /// Forgets an ID so the server may reintroduce the row later.
    pub fn forget(&mut self, id: &RowId) -> bool {
        self.seen.remove(id)
    }

    /// Forgets every ID.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Returns the number of IDs seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been seen.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
