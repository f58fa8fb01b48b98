//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Notify;

use sheet_lib::Grid;
use sheet_lib::GridConfig;
use sheet_lib::api::query::Page;
use sheet_lib::api::query::SearchRequest;
use sheet_lib::error::ServiceError;
use sheet_lib::model::ColumnSchema;
use sheet_lib::model::FieldType;
use sheet_lib::model::Record;
use sheet_lib::model::Schema;
use sheet_lib::model::TableDefinition;
use sheet_lib::model::TableId;
use sheet_lib::model::Value;
use sheet_lib::notify::MemoryNotifier;
use sheet_lib::service::InMemoryTableService;
use sheet_lib::service::TableService;

pub const PEOPLE: &str = "ta_people";
pub const PETS: &str = "ta_pets";

pub fn init_logging() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Trace, simplelog::Config::default());
}

/// Records `ro_1..=ro_n`, each with a `name` column.
pub fn people(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| Record::new(format!("ro_{i}")).set("name", format!("Person {i}")))
        .collect()
}

fn definition(table: &str) -> TableDefinition {
    let schema = Schema::new()
        .column("name", ColumnSchema::new(FieldType::String).required())
        .column("age", ColumnSchema::new(FieldType::Number));
    TableDefinition::new(table, schema).with_primary_display("name")
}

/// A [`TableService`] over [`InMemoryTableService`] that counts calls, fails
/// on demand and can hold individual requests until released.
#[derive(Default)]
pub struct ScriptedService {
    inner: InMemoryTableService,
    pub definitions: AtomicUsize,
    pub creates: AtomicUsize,
    pub searches: AtomicUsize,
    pub saves: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_save: AtomicBool,
    pub fail_delete: AtomicBool,
    search_gates: DashMap<TableId, Arc<Notify>>,
    save_gate: std::sync::Mutex<Option<Arc<Notify>>>,
    delete_gate: std::sync::Mutex<Option<Arc<Notify>>>,
}

impl ScriptedService {
    /// A service with the people and pets tables, `people` rows in the first.
    pub fn with_people(people: Vec<Record>) -> Self {
        let service = Self::default();
        service.inner.insert_table(definition(PEOPLE));
        service.inner.insert_table(definition(PETS));
        service.inner.insert_records(&PEOPLE.into(), people);
        service
    }

    pub fn backend(&self) -> &InMemoryTableService {
        &self.inner
    }

    /// Holds the next search against `table` until the returned handle is notified.
    pub fn hold_next_search(&self, table: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.search_gates.insert(table.into(), Arc::clone(&gate));
        gate
    }

    /// Holds the next save until the returned handle is notified.
    pub fn hold_next_save(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.save_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Holds the next bulk delete until the returned handle is notified.
    pub fn hold_next_delete(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.delete_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn injected(flag: &AtomicBool) -> Result<(), ServiceError> {
        if flag.load(Ordering::SeqCst) {
            Err(ServiceError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TableService for ScriptedService {
    async fn definition(&self, table: &TableId) -> Result<TableDefinition, ServiceError> {
        self.definitions.fetch_add(1, Ordering::SeqCst);
        self.inner.definition(table).await
    }

    async fn create(&self, table: &TableId, fields: HashMap<String, Value>) -> Result<Record, ServiceError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_create)?;
        self.inner.create(table, fields).await
    }

    async fn search(&self, request: SearchRequest) -> Result<Page, ServiceError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let gate = self.search_gates.remove(&request.table).map(|(_, gate)| gate);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Self::injected(&self.fail_search)?;
        self.inner.search(request).await
    }

    async fn save(&self, table: &TableId, record: &Record) -> Result<Record, ServiceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let gate = self.save_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Self::injected(&self.fail_save)?;
        self.inner.save(table, record).await
    }

    async fn bulk_delete(&self, table: &TableId, records: &[Record]) -> Result<(), ServiceError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let gate = self.delete_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Self::injected(&self.fail_delete)?;
        self.inner.bulk_delete(table, records).await
    }
}

/// A grid over a [`ScriptedService`] reporting into a [`MemoryNotifier`].
pub struct Harness {
    pub service: Arc<ScriptedService>,
    pub notifier: Arc<MemoryNotifier>,
    pub grid: Grid,
}

impl Harness {
    pub fn new(people: Vec<Record>) -> Self {
        Self::with_config(people, GridConfig::default())
    }

    pub fn with_config(people: Vec<Record>, config: GridConfig) -> Self {
        init_logging();
        let service = Arc::new(ScriptedService::with_people(people));
        let notifier = Arc::new(MemoryNotifier::new());
        let grid = Grid::new(service.clone(), notifier.clone(), config).unwrap();
        Self {
            service,
            notifier,
            grid,
        }
    }

    /// IDs of the loaded rows in order.
    pub fn ids(&self) -> Vec<String> {
        self.grid
            .rows()
            .rows()
            .with(|rows| rows.iter().map(|row| row.id().to_string()).collect())
    }

    /// IDs of the rows the server holds for the people table.
    pub fn server_ids(&self) -> Vec<String> {
        self.service
            .backend()
            .records(&PEOPLE.into())
            .iter()
            .map(|record| record.id().to_string())
            .collect()
    }

    /// Loads pages until the current context is exhausted.
    pub async fn drain_pages(&self) {
        let rows = self.grid.rows();
        while rows.has_next_page() {
            rows.load_next_page().await.unwrap();
        }
    }

    /// Asserts every row's position equals its index.
    pub fn assert_positions(&self) {
        self.grid.rows().rows().with(|rows| {
            for (index, row) in rows.iter().enumerate() {
                assert_eq!(row.position(), index, "row {} out of place", row.id());
            }
        });
    }
}
