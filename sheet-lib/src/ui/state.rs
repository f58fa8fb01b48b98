//! Focus, hover and selection state

use std::collections::HashSet;

use log::trace;

use super::CellId;
use super::FocusTarget;
use super::RowDensity;
use crate::model::RowId;
use crate::model::RowSet;

/// Interaction state of one grid.
///
/// Fields are only changed through methods that keep the derived values
/// consistent: setting a focus clears the hover, and every change of the
/// focused row records the row it replaced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FocusState {
    focused_cell: Option<CellId>,
    focused_row: Option<FocusTarget>,
    previous_focused_row: Option<FocusTarget>,
    hovered_row: Option<FocusTarget>,
    selected_rows: HashSet<RowId>,
    density: RowDensity,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused cell.
    pub fn focused_cell(&self) -> Option<&CellId> {
        self.focused_cell.as_ref()
    }

    /// Row component of the focused cell.
    pub fn focused_row_id(&self) -> Option<&FocusTarget> {
        self.focused_row.as_ref()
    }

    /// The focused row before the most recent change of focused row.
    pub fn previous_focused_row_id(&self) -> Option<&FocusTarget> {
        self.previous_focused_row.as_ref()
    }

    /// The row under the pointer.
    pub fn hovered_row_id(&self) -> Option<&FocusTarget> {
        self.hovered_row.as_ref()
    }

    pub fn selected_rows(&self) -> &HashSet<RowId> {
        &self.selected_rows
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected_rows.contains(id)
    }

    pub fn density(&self) -> RowDensity {
        self.density
    }

    /// Lines of cell content per row at the current density.
    pub fn content_lines(&self) -> usize {
        self.density.content_lines()
    }

    /// Moves focus. A non-empty focus clears the hover.
    pub(crate) fn set_focus(&mut self, cell: Option<CellId>) -> bool {
        if self.focused_cell == cell {
            return false;
        }
        if cell.is_some() {
            self.hovered_row = None;
        }
        self.focused_cell = cell;
        self.track_focused_row();
        true
    }

    pub(crate) fn set_hover(&mut self, target: Option<FocusTarget>) -> bool {
        if self.hovered_row == target {
            return false;
        }
        self.hovered_row = target;
        true
    }

    pub(crate) fn select(&mut self, id: RowId) -> bool {
        self.selected_rows.insert(id)
    }

    pub(crate) fn deselect(&mut self, id: &RowId) -> bool {
        self.selected_rows.remove(id)
    }

    pub(crate) fn clear_selection(&mut self) -> bool {
        let changed = !self.selected_rows.is_empty();
        self.selected_rows.clear();
        changed
    }

    pub(crate) fn set_density(&mut self, density: RowDensity) -> bool {
        let changed = self.density != density;
        self.density = density;
        changed
    }

    /// Clears focus, hover and selection.
    pub(crate) fn blur(&mut self) -> bool {
        let cleared = self.focused_cell.is_some() || self.hovered_row.is_some();
        self.focused_cell = None;
        self.hovered_row = None;
        self.track_focused_row();
        self.clear_selection() || cleared
    }

    /// Drops every reference to a row that is no longer in `rows`.
    ///
    /// The new row is always kept. Returns `true` if anything was dropped.
    pub(crate) fn prune(&mut self, rows: &RowSet) -> bool {
        let present = |target: &FocusTarget| target.row_id().is_none_or(|id| rows.contains(id));
        let mut changed = false;

        if self.focused_cell.as_ref().is_some_and(|cell| !present(&cell.row)) {
            trace!("Clearing focus on removed row");
            self.focused_cell = None;
            self.track_focused_row();
            changed = true;
        }
        if self.hovered_row.as_ref().is_some_and(|target| !present(target)) {
            trace!("Clearing hover on removed row");
            self.hovered_row = None;
            changed = true;
        }

        let before = self.selected_rows.len();
        self.selected_rows.retain(|id| rows.contains(id));
        if self.selected_rows.len() != before {
            trace!("Deselected {} removed rows", before - self.selected_rows.len());
            changed = true;
        }
        changed
    }

    /// Records the outgoing focused row whenever the derived row changes.
    fn track_focused_row(&mut self) {
        let current = self.focused_cell.as_ref().map(|cell| cell.row.clone());
        if current != self.focused_row {
            self.previous_focused_row = std::mem::replace(&mut self.focused_row, current);
        }
    }
}
