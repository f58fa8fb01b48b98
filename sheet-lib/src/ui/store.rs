//! The UI store

use std::collections::HashSet;
use std::sync::Mutex;

use log::debug;

use super::CellId;
use super::FocusState;
use super::FocusTarget;
use super::RowDensity;
use super::TableSettings;
use crate::model::Row;
use crate::model::RowId;
use crate::model::RowSet;
use crate::model::Value;
use crate::signal::ReadSignal;
use crate::signal::Signal;
use crate::signal::Subscription;

/// The focused row as seen by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusedRow {
    /// A loaded row.
    Row(Row),
    /// The pending new row. It carries no fields.
    NewRow,
}

impl FocusedRow {
    pub fn target(&self) -> FocusTarget {
        match self {
            Self::Row(row) => FocusTarget::Row(row.id().clone()),
            Self::NewRow => FocusTarget::NewRow,
        }
    }

    /// Field value. Always `None` for the new row.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Row(row) => row.get(field),
            Self::NewRow => None,
        }
    }

    pub fn row(&self) -> Option<&Row> {
        match self {
            Self::Row(row) => Some(row),
            Self::NewRow => None,
        }
    }
}

/// Owns focus, hover, selection and density for one grid.
///
/// The store watches the row collection and drops references to rows that
/// disappear. Setters ignore IDs of rows that are not loaded.
pub struct UiStore {
    state: Signal<FocusState>,
    rows: ReadSignal<RowSet>,
    _pruning: Subscription,
    density_binding: Mutex<Option<Subscription>>,
}

impl UiStore {
    /// Creates a store tracking the given row collection.
    pub fn new(rows: ReadSignal<RowSet>) -> Self {
        let state = Signal::new(FocusState::new());

        let weak = state.downgrade();
        let pruning = rows.subscribe(move |rows| {
            if let Some(state) = weak.upgrade() {
                state.update_if(|focus| focus.prune(rows));
            }
        });

        // Rows may already be loaded.
        let snapshot = rows.get();
        state.update_if(|focus| focus.prune(&snapshot));

        Self {
            state,
            rows,
            _pruning: pruning,
            density_binding: Mutex::new(None),
        }
    }

    /// Read handle to the full interaction state.
    pub fn state(&self) -> ReadSignal<FocusState> {
        self.state.reader()
    }

    /// Observes every change of the interaction state.
    pub fn subscribe(&self, f: impl Fn(&FocusState) + Send + Sync + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    /// Drives the row density from table settings, now and on every change.
    ///
    /// Replaces any previous binding.
    pub fn bind_table_settings(&self, settings: &ReadSignal<TableSettings>) {
        self.set_density(settings.get().density());

        let weak = self.state.downgrade();
        let binding = settings.subscribe(move |settings| {
            if let Some(state) = weak.upgrade() {
                let density = settings.density();
                state.update_if(|focus| focus.set_density(density));
            }
        });

        let mut slot = self.density_binding.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(binding);
    }

    pub fn set_density(&self, density: RowDensity) {
        if self.state.update_if(|focus| focus.set_density(density)) {
            debug!("Row density set to {density:?}");
        }
    }

    /// Focuses a cell, or clears focus with `None`.
    ///
    /// Returns `false` if the cell's row is not loaded or focus did not change.
    pub fn focus_cell(&self, cell: Option<CellId>) -> bool {
        self.state.update_if(|focus| {
            if let Some(cell) = &cell
                && !self.is_present(&cell.row)
            {
                return false;
            }
            focus.set_focus(cell)
        })
    }

    /// Sets the hovered row, or clears it with `None`.
    pub fn hover_row(&self, target: Option<FocusTarget>) -> bool {
        self.state.update_if(|focus| {
            if let Some(target) = &target
                && !self.is_present(target)
            {
                return false;
            }
            focus.set_hover(target)
        })
    }

    pub fn select_row(&self, id: &RowId) -> bool {
        self.state
            .update_if(|focus| self.rows.with(|rows| rows.contains(id)) && focus.select(id.clone()))
    }

    pub fn deselect_row(&self, id: &RowId) -> bool {
        self.state.update_if(|focus| focus.deselect(id))
    }

    /// Flips the selection of a row. Returns whether it is selected afterwards.
    pub fn toggle_row_selection(&self, id: &RowId) -> bool {
        if self.is_selected(id) {
            self.deselect_row(id);
            false
        } else {
            self.select_row(id)
        }
    }

    pub fn clear_selection(&self) {
        self.state.update_if(FocusState::clear_selection);
    }

    /// Clears focus, selection and hover.
    pub fn blur(&self) {
        if self.state.update_if(FocusState::blur) {
            debug!("Grid blurred");
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.state.with(|focus| focus.is_selected(id))
    }

    pub fn selected_rows(&self) -> HashSet<RowId> {
        self.state.with(|focus| focus.selected_rows().clone())
    }

    pub fn focused_cell(&self) -> Option<CellId> {
        self.state.with(|focus| focus.focused_cell().cloned())
    }

    pub fn focused_row_id(&self) -> Option<FocusTarget> {
        self.state.with(|focus| focus.focused_row_id().cloned())
    }

    pub fn previous_focused_row_id(&self) -> Option<FocusTarget> {
        self.state.with(|focus| focus.previous_focused_row_id().cloned())
    }

    pub fn hovered_row_id(&self) -> Option<FocusTarget> {
        self.state.with(|focus| focus.hovered_row_id().cloned())
    }

    /// The row behind the focused cell.
    pub fn focused_row(&self) -> Option<FocusedRow> {
        match self.focused_row_id()? {
            FocusTarget::NewRow => Some(FocusedRow::NewRow),
            FocusTarget::Row(id) => self.rows.with(|rows| rows.row(&id).cloned()).map(FocusedRow::Row),
        }
    }

    pub fn density(&self) -> RowDensity {
        self.state.with(FocusState::density)
    }

    pub fn content_lines(&self) -> usize {
        self.density().content_lines()
    }

    /// Checked while the focus state is write-locked, so a removal either
    /// lands first or is pruned by its own notification afterwards.
    fn is_present(&self, target: &FocusTarget) -> bool {
        target.row_id().is_none_or(|id| self.rows.with(|rows| rows.contains(id)))
    }
}

impl std::fmt::Debug for UiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiStore").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::model::Record;

    fn rows_with(ids: &[&str]) -> Signal<RowSet> {
        let mut rows = RowSet::new();
        rows.append(ids.iter().map(|id| Record::new(*id).set("name", *id)));
        Signal::new(rows)
    }

    fn remove(rows: &Signal<RowSet>, id: &str) {
        rows.update(|rows| {
            rows.remove(&HashSet::from([RowId::new(id)]));
        });
    }

    #[test]
    fn test_setters_ignore_unknown_rows() {
        let rows = rows_with(&["a"]);
        let ui = UiStore::new(rows.reader());

        assert!(!ui.focus_cell(Some(CellId::new(RowId::new("zz"), "name"))));
        assert!(!ui.hover_row(Some(FocusTarget::Row(RowId::new("zz")))));
        assert!(!ui.select_row(&RowId::new("zz")));
        assert!(ui.focus_cell(Some(CellId::new_row("name"))));
    }

    #[test]
    fn test_removal_prunes_everything_in_one_notification() {
        let rows = rows_with(&["a", "b"]);
        let ui = UiStore::new(rows.reader());
        ui.hover_row(Some(FocusTarget::Row(RowId::new("b"))));
        ui.focus_cell(Some(CellId::new(RowId::new("a"), "name")));
        ui.hover_row(Some(FocusTarget::Row(RowId::new("a"))));
        ui.select_row(&RowId::new("a"));
        ui.select_row(&RowId::new("b"));

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let _sub = ui.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        remove(&rows, "a");
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(ui.focused_cell(), None);
        assert_eq!(ui.hovered_row_id(), None);
        assert_eq!(ui.selected_rows(), HashSet::from([RowId::new("b")]));
        assert_eq!(ui.previous_focused_row_id(), Some(FocusTarget::Row(RowId::new("a"))));
    }

    #[test]
    fn test_unrelated_change_does_not_notify() {
        let rows = rows_with(&["a", "b"]);
        let ui = UiStore::new(rows.reader());
        ui.select_row(&RowId::new("a"));

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let _sub = ui.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        remove(&rows, "b");
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        assert!(ui.is_selected(&RowId::new("a")));
    }

    #[test]
    fn test_focused_row_follows_position() {
        let rows = rows_with(&["a", "b"]);
        let ui = UiStore::new(rows.reader());
        ui.focus_cell(Some(CellId::new(RowId::new("b"), "name")));

        remove(&rows, "a");
        let Some(FocusedRow::Row(row)) = ui.focused_row() else {
            panic!("expected a loaded row");
        };
        assert_eq!(row.id(), &RowId::new("b"));
        assert_eq!(row.position(), 0);
    }

    #[test]
    fn test_focused_new_row_has_no_fields() {
        let rows = rows_with(&["a"]);
        let ui = UiStore::new(rows.reader());
        ui.focus_cell(CellId::parse("new-colA"));

        let focused = ui.focused_row().unwrap();
        assert_eq!(focused, FocusedRow::NewRow);
        assert_eq!(focused.target(), FocusTarget::NewRow);
        assert_eq!(focused.get("colA"), None);
    }

    #[test]
    fn test_toggle_selection() {
        let rows = rows_with(&["a"]);
        let ui = UiStore::new(rows.reader());
        let id = RowId::new("a");

        assert!(ui.toggle_row_selection(&id));
        assert!(ui.is_selected(&id));
        assert!(!ui.toggle_row_selection(&id));
        assert!(!ui.is_selected(&id));
    }

    #[test]
    fn test_density_follows_settings() {
        let rows = rows_with(&[]);
        let ui = UiStore::new(rows.reader());
        let settings = Signal::new(TableSettings::default());
        ui.bind_table_settings(&settings.reader());
        assert_eq!(ui.density(), RowDensity::Standard);
        assert_eq!(ui.content_lines(), 2);

        settings.set(TableSettings::default().with_row_height(92));
        assert_eq!(ui.content_lines(), 3);

        settings.set(TableSettings::default().with_row_height(36));
        assert_eq!(ui.density(), RowDensity::Compact);
        assert_eq!(ui.content_lines(), 1);
    }

    #[test]
    fn test_concurrent_removal_never_leaves_stale_references() {
        let rows = rows_with(&[]);
        let ui = UiStore::new(rows.reader());
        let id = RowId::new("a");

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..500 {
                    rows.update(|rows| {
                        rows.append(vec![Record::new("a")]);
                    });
                    remove(&rows, "a");
                }
            });
            scope.spawn(|| {
                for _ in 0..500 {
                    ui.focus_cell(Some(CellId::new(id.clone(), "name")));
                    ui.hover_row(Some(FocusTarget::Row(id.clone())));
                    ui.select_row(&id);
                }
            });
        });

        assert!(rows.get().is_empty());
        assert_eq!(ui.focused_cell(), None);
        assert_eq!(ui.hovered_row_id(), None);
        assert!(ui.selected_rows().is_empty());
    }

    #[test]
    fn test_dropped_store_stops_pruning() {
        let rows = rows_with(&["a"]);
        let ui = UiStore::new(rows.reader());
        drop(ui);

        remove(&rows, "a");
        assert!(rows.get().is_empty());
    }
}
