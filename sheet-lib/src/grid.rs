//! Per-instance grid container

use std::sync::Arc;

use crate::config::GridConfig;
use crate::error::Error;
use crate::fetch::FetchContext;
use crate::notify::LogNotifier;
use crate::notify::Notifier;
use crate::rows::RowStore;
use crate::service::TableService;
use crate::signal::ReadSignal;
use crate::signal::Signal;
use crate::ui::FocusedRow;
use crate::ui::TableSettings;
use crate::ui::UiStore;

/// One grid: a row store, the interaction state that tracks it and the
/// table settings driving its density.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use sheet_lib::fetch::FetchContext;
/// use sheet_lib::model::{Record, RowId, Schema, TableDefinition};
/// use sheet_lib::service::InMemoryTableService;
/// use sheet_lib::ui::CellId;
/// use sheet_lib::Grid;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let service = InMemoryTableService::new().with_table(TableDefinition::new("ta_tasks", Schema::new()));
/// service.insert_records(&"ta_tasks".into(), [Record::new("ro_1").set("title", "Write docs")]);
///
/// let grid = Grid::with_service(Arc::new(service));
/// grid.configure(FetchContext::new("ta_tasks")).await.unwrap();
///
/// grid.ui().focus_cell(CellId::parse("ro_1-title"));
/// let focused = grid.focused_row().unwrap();
/// assert_eq!(focused.get("title").and_then(|v| v.as_str()), Some("Write docs"));
///
/// grid.rows().delete_rows(&[grid.rows().row(&RowId::new("ro_1")).unwrap()]).await.unwrap();
/// assert!(grid.focused_row().is_none());
/// # });
/// ```
pub struct Grid {
    rows: RowStore,
    ui: UiStore,
    settings: Signal<TableSettings>,
}

impl Grid {
    /// Fails with [`Error::Config`] if `config` does not validate.
    pub fn new(service: Arc<dyn TableService>, notifier: Arc<dyn Notifier>, config: GridConfig) -> Result<Self, Error> {
        Ok(Self::from_rows(RowStore::new(service, notifier, config)?))
    }

    /// Creates a grid with the default configuration, reporting errors to the log.
    pub fn with_service(service: Arc<dyn TableService>) -> Self {
        Self::from_rows(RowStore::assemble(service, Arc::new(LogNotifier), GridConfig::default()))
    }

    fn from_rows(rows: RowStore) -> Self {
        let ui = UiStore::new(rows.rows());
        let settings = Signal::new(TableSettings::default());
        ui.bind_table_settings(&settings.reader());
        Self { rows, ui, settings }
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    pub fn table_settings(&self) -> ReadSignal<TableSettings> {
        self.settings.reader()
    }

    /// Replaces the table settings. The row density follows.
    pub fn set_table_settings(&self, settings: TableSettings) {
        if *self.settings.get() != settings {
            self.settings.set(settings);
        }
    }

    /// Points the grid at a datasource and filter.
    pub async fn configure(&self, context: FetchContext) -> Result<(), Error> {
        self.rows.configure(context).await
    }

    pub fn focused_row(&self) -> Option<FocusedRow> {
        self.ui.focused_row()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("ui", &self.ui)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::service::InMemoryTableService;

    #[test]
    fn test_new_rejects_invalid_config() {
        let service: Arc<dyn TableService> = Arc::new(InMemoryTableService::new());
        let notifier: Arc<dyn Notifier> = Arc::new(MemoryNotifier::new());

        let zero_page = Grid::new(Arc::clone(&service), Arc::clone(&notifier), GridConfig::default().with_page_size(0));
        assert!(matches!(zero_page, Err(Error::Config(_))));

        let grid = Grid::new(service, notifier, GridConfig::default().with_page_size(25)).unwrap();
        assert!(!grid.rows().is_hydrated());
    }
}
