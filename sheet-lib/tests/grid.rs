//! Integration tests for focus, selection and density on a live grid.
//!
//! Run with: `cargo test -p sheet-lib --test grid`

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use common::Harness;
use common::PEOPLE;
use common::PETS;
use common::people;

use sheet_lib::fetch::FetchContext;
use sheet_lib::model::RowId;
use sheet_lib::model::Value;
use sheet_lib::ui::CellId;
use sheet_lib::ui::FocusTarget;
use sheet_lib::ui::FocusedRow;
use sheet_lib::ui::RowDensity;
use sheet_lib::ui::TableSettings;

fn id(s: &str) -> RowId {
    RowId::new(s)
}

fn row_target(s: &str) -> Option<FocusTarget> {
    Some(FocusTarget::Row(id(s)))
}

async fn loaded(count: usize) -> Harness {
    let harness = Harness::new(people(count));
    harness.grid.configure(FetchContext::new(PEOPLE)).await.unwrap();
    harness
}

// =============================================================================
// Pruning
// =============================================================================

mod pruning {
    use super::*;

    #[tokio::test]
    async fn test_deleted_row_is_unreferenced() {
        let harness = loaded(3).await;
        let ui = harness.grid.ui();
        ui.focus_cell(Some(CellId::new(id("ro_2"), "name")));
        ui.hover_row(row_target("ro_2"));
        ui.select_row(&id("ro_1"));
        ui.select_row(&id("ro_2"));

        let row = harness.grid.rows().row(&id("ro_2")).unwrap();
        harness.grid.rows().delete_rows(&[row]).await.unwrap();

        assert_eq!(ui.focused_cell(), None);
        assert_eq!(ui.focused_row_id(), None);
        assert_eq!(ui.hovered_row_id(), None);
        assert_eq!(ui.selected_rows(), HashSet::from([id("ro_1")]));
        assert_eq!(ui.previous_focused_row_id(), row_target("ro_2"));
    }

    #[tokio::test]
    async fn test_row_vanishing_on_refresh_is_unreferenced() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.select_row(&id("ro_1"));
        ui.focus_cell(Some(CellId::new(id("ro_1"), "name")));
        harness.service.backend().remove_record(&PEOPLE.into(), &id("ro_1"));

        harness.grid.rows().refresh_row(&id("ro_1")).await.unwrap();

        assert_eq!(ui.focused_cell(), None);
        assert!(ui.selected_rows().is_empty());
    }

    #[tokio::test]
    async fn test_context_change_clears_references() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.focus_cell(Some(CellId::new(id("ro_1"), "name")));
        ui.select_row(&id("ro_2"));

        harness.grid.configure(FetchContext::new(PETS)).await.unwrap();

        assert_eq!(ui.focused_cell(), None);
        assert!(ui.selected_rows().is_empty());
    }

    #[tokio::test]
    async fn test_new_row_focus_survives_pruning() {
        let harness = loaded(1).await;
        let ui = harness.grid.ui();
        ui.focus_cell(Some(CellId::new_row("name")));

        let row = harness.grid.rows().row(&id("ro_1")).unwrap();
        harness.grid.rows().delete_rows(&[row]).await.unwrap();

        assert_eq!(ui.focused_row_id(), Some(FocusTarget::NewRow));
    }

    #[tokio::test]
    async fn test_observers_never_see_stale_focus() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.focus_cell(Some(CellId::new(id("ro_1"), "name")));

        let rows = harness.grid.rows().rows();
        let violations = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&violations);
        let _sub = ui.subscribe(move |state| {
            if let Some(row) = state.focused_row_id().and_then(FocusTarget::row_id)
                && !rows.with(|rows| rows.contains(row))
            {
                sink.lock().unwrap().push(row.clone());
            }
        });

        let row = harness.grid.rows().row(&id("ro_1")).unwrap();
        harness.grid.rows().delete_rows(&[row]).await.unwrap();

        assert!(violations.lock().unwrap().is_empty());
        assert_eq!(ui.focused_cell(), None);
    }
}

// =============================================================================
// Focus and hover
// =============================================================================

mod focus {
    use super::*;

    #[tokio::test]
    async fn test_focus_clears_hover() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.hover_row(row_target("ro_1"));

        ui.focus_cell(CellId::parse("ro_2-name"));

        assert_eq!(ui.hovered_row_id(), None);
        assert_eq!(ui.focused_row_id(), row_target("ro_2"));
    }

    #[tokio::test]
    async fn test_previous_focused_row() {
        let harness = loaded(3).await;
        let ui = harness.grid.ui();

        ui.focus_cell(CellId::parse("ro_1-name"));
        ui.focus_cell(CellId::parse("ro_2-name"));
        ui.focus_cell(CellId::parse("ro_3-name"));

        assert_eq!(ui.previous_focused_row_id(), row_target("ro_2"));
    }

    #[tokio::test]
    async fn test_focused_row_reflects_updates() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.focus_cell(CellId::parse("ro_2-name"));

        harness
            .grid
            .rows()
            .update_row(&id("ro_2"), "name", Value::from("Grace"))
            .await
            .unwrap();

        let focused = harness.grid.focused_row().unwrap();
        assert_eq!(focused.get("name"), Some(&Value::from("Grace")));
        assert_eq!(focused.row().map(|row| row.position()), Some(1));
    }

    #[tokio::test]
    async fn test_focused_new_row_is_a_placeholder() {
        let harness = loaded(2).await;

        harness.grid.ui().focus_cell(CellId::parse("new-colA"));

        let focused = harness.grid.focused_row().unwrap();
        assert_eq!(focused, FocusedRow::NewRow);
        assert_eq!(focused.target(), FocusTarget::NewRow);
        assert_eq!(focused.get("name"), None);
        assert_eq!(focused.row(), None);
    }

    #[tokio::test]
    async fn test_blur_clears_everything() {
        let harness = loaded(2).await;
        let ui = harness.grid.ui();
        ui.focus_cell(CellId::parse("ro_1-name"));
        ui.hover_row(row_target("ro_2"));
        ui.select_row(&id("ro_1"));
        ui.select_row(&id("ro_2"));

        ui.blur();

        assert_eq!(ui.focused_cell(), None);
        assert_eq!(ui.hovered_row_id(), None);
        assert!(ui.selected_rows().is_empty());
    }
}

// =============================================================================
// Density
// =============================================================================

mod density {
    use super::*;

    #[tokio::test]
    async fn test_density_follows_table_settings() {
        let harness = loaded(1).await;
        let ui = harness.grid.ui();
        assert_eq!(ui.density(), RowDensity::Standard);
        assert_eq!(ui.content_lines(), 2);

        harness.grid.set_table_settings(TableSettings::default().with_row_height(92));
        assert_eq!(ui.density(), RowDensity::Expanded);
        assert_eq!(ui.content_lines(), 3);

        harness.grid.set_table_settings(TableSettings::default().with_row_height(36));
        assert_eq!(ui.content_lines(), 1);

        harness.grid.set_table_settings(TableSettings::default());
        assert_eq!(ui.density(), RowDensity::Standard);
    }
}
