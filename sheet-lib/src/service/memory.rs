//! In-memory table service implementation using DashMap

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;

use super::TableService;
use crate::api::query::Bookmark;
use crate::api::query::Direction;
use crate::api::query::Page;
use crate::api::query::SearchRequest;
use crate::error::Operation;
use crate::error::ServiceError;
use crate::model::Record;
use crate::model::RowId;
use crate::model::TableDefinition;
use crate::model::TableId;
use crate::model::Value;

/// Function computing a derived column from the stored row.
pub type ComputedColumn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// A stored row and its insertion sequence number, which never changes and
/// is never reused within a table.
struct StoredRecord {
    seq: u64,
    record: Record,
}

struct MemoryTable {
    definition: TableDefinition,
    records: Vec<StoredRecord>,
    next_seq: u64,
    computed: Vec<(String, ComputedColumn)>,
}

impl MemoryTable {
    fn new(definition: TableDefinition) -> Self {
        Self {
            definition,
            records: Vec::new(),
            next_seq: 0,
            computed: Vec::new(),
        }
    }

    fn push(&mut self, record: Record) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(StoredRecord { seq, record });
    }

    fn enrich(&self, record: &Record) -> Record {
        let mut enriched = record.clone();
        for (column, compute) in &self.computed {
            enriched.insert(column.clone(), compute(record));
        }
        enriched
    }
}

/// An in-process table backend backed by a concurrent hash map.
///
/// Rows keep insertion order. Computed columns are evaluated on reads through
/// [`search`](TableService::search) only, so [`create`](TableService::create)
/// returns an un-enriched record the same way many real backends do.
///
/// # Example
///
/// ```
/// use sheet_lib::model::{ColumnSchema, FieldType, Record, Schema, TableDefinition};
/// use sheet_lib::service::InMemoryTableService;
///
/// let schema = Schema::new().column("name", ColumnSchema::new(FieldType::String));
/// let service = InMemoryTableService::new()
///     .with_table(TableDefinition::new("ta_users", schema).with_primary_display("name"));
/// service.insert_records(&"ta_users".into(), [Record::new("ro_1").set("name", "Ada")]);
/// assert_eq!(service.records(&"ta_users".into()).len(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryTableService {
    tables: DashMap<TableId, MemoryTable>,
}

impl InMemoryTableService {
    /// Creates a service without tables.
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Registers a table (builder pattern).
    pub fn with_table(self, definition: TableDefinition) -> Self {
        self.insert_table(definition);
        self
    }

    /// Registers or replaces a table, dropping its rows.
    pub fn insert_table(&self, definition: TableDefinition) {
        self.tables.insert(definition.id.clone(), MemoryTable::new(definition));
    }

    /// Registers a computed column on an existing table.
    ///
    /// Returns `false` if the table does not exist.
    pub fn insert_computed(
        &self,
        table: &TableId,
        column: impl Into<String>,
        compute: impl Fn(&Record) -> Value + Send + Sync + 'static,
    ) -> bool {
        match self.tables.get_mut(table) {
            Some(mut entry) => {
                entry.computed.push((column.into(), Arc::new(compute)));
                true
            }
            None => false,
        }
    }

    /// Inserts rows directly, bypassing the service API.
    pub fn insert_records(&self, table: &TableId, records: impl IntoIterator<Item = Record>) -> bool {
        match self.tables.get_mut(table) {
            Some(mut entry) => {
                for record in records {
                    entry.push(record);
                }
                true
            }
            None => false,
        }
    }

    /// Removes a row directly, as if another client deleted it.
    pub fn remove_record(&self, table: &TableId, id: &RowId) -> bool {
        match self.tables.get_mut(table) {
            Some(mut entry) => {
                let before = entry.records.len();
                entry.records.retain(|stored| stored.record.id() != id);
                entry.records.len() != before
            }
            None => false,
        }
    }

    /// Returns a snapshot of the stored rows (without computed columns).
    pub fn records(&self, table: &TableId) -> Vec<Record> {
        self.tables
            .get(table)
            .map(|entry| entry.records.iter().map(|stored| stored.record.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the stored row with the given ID.
    pub fn record(&self, table: &TableId, id: &RowId) -> Option<Record> {
        let entry = self.tables.get(table)?;
        entry
            .records
            .iter()
            .find(|stored| stored.record.id() == id)
            .map(|stored| stored.record.clone())
    }
}

impl std::fmt::Debug for InMemoryTableService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTableService")
            .field("tables", &self.tables.len())
            .finish()
    }
}

/// Position after the last row of a page: its sort key and sequence number.
///
/// Rows are ordered by sort key (when sorting) and then by sequence, so the
/// next page starts at the first row ordered after the cursor. Deleting rows
/// before the cursor never shifts it, and the cursor stays valid even if the
/// row it was taken from is gone.
#[derive(Debug, Serialize, Deserialize)]
struct PageCursor {
    seq: u64,
    #[serde(default)]
    key: Value,
}

impl PageCursor {
    fn decode(bookmark: &Bookmark) -> Result<Self, ServiceError> {
        serde_json::from_str(bookmark.as_str())
            .map_err(|_| ServiceError::rejected(Operation::Search, format!("invalid bookmark '{}'", bookmark.as_str())))
    }

    fn encode(&self) -> Result<Bookmark, ServiceError> {
        serde_json::to_string(self)
            .map(Bookmark::new)
            .map_err(|err| ServiceError::rejected(Operation::Search, err.to_string()))
    }

    fn precedes(&self, key: &Value, seq: u64, direction: Option<Direction>) -> bool {
        let ordering = direction.map_or(Ordering::Equal, |direction| directed(key, &self.key, direction));
        ordering.then(seq.cmp(&self.seq)) == Ordering::Greater
    }
}

fn directed(a: &Value, b: &Value, direction: Direction) -> Ordering {
    let ordering = a.compare(b).unwrap_or(Ordering::Equal);
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl TableService for InMemoryTableService {
    async fn definition(&self, table: &TableId) -> Result<TableDefinition, ServiceError> {
        self.tables
            .get(table)
            .map(|entry| entry.definition.clone())
            .ok_or_else(|| ServiceError::TableNotFound(table.clone()))
    }

    async fn create(&self, table: &TableId, fields: HashMap<String, Value>) -> Result<Record, ServiceError> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ServiceError::TableNotFound(table.clone()))?;

        let record = Record::with_fields(RowId::generate(), fields);
        entry.push(record.clone());
        Ok(record)
    }

    async fn search(&self, request: SearchRequest) -> Result<Page, ServiceError> {
        let entry = self
            .tables
            .get(&request.table)
            .ok_or_else(|| ServiceError::TableNotFound(request.table.clone()))?;

        let key_of = |record: &Record| {
            request
                .sort
                .as_ref()
                .and_then(|sort| record.get(&sort.column).cloned())
                .unwrap_or_default()
        };
        let direction = request.sort.as_ref().map(|sort| sort.direction);

        // Stored order is sequence order; the stable sort keeps it for ties.
        let mut matched: Vec<(u64, Value, Record)> = entry
            .records
            .iter()
            .map(|stored| (stored.seq, entry.enrich(&stored.record)))
            .filter(|(_, record)| request.filter.as_ref().is_none_or(|filter| filter.matches(record)))
            .map(|(seq, record)| (seq, key_of(&record), record))
            .collect();
        if let Some(direction) = direction {
            matched.sort_by(|(_, a, _), (_, b, _)| directed(a, b, direction));
        }

        let start = match request.bookmark.as_ref().map(PageCursor::decode).transpose()? {
            None => 0,
            Some(cursor) => matched
                .iter()
                .position(|(seq, key, _)| cursor.precedes(key, *seq, direction))
                .unwrap_or(matched.len()),
        };
        let end = (start + request.limit.max(1)).min(matched.len());
        let next = if request.paginate && end < matched.len() {
            let (seq, key, _) = &matched[end - 1];
            Some(PageCursor { seq: *seq, key: key.clone() }.encode()?)
        } else {
            None
        };

        let records = matched.drain(start..end).map(|(_, _, record)| record).collect();
        let page = Page::new(records);
        Ok(match next {
            Some(bookmark) => page.with_next(bookmark),
            None => page,
        })
    }

    async fn save(&self, table: &TableId, record: &Record) -> Result<Record, ServiceError> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ServiceError::TableNotFound(table.clone()))?;

        // Computed columns are never stored.
        let fields: HashMap<String, Value> = record
            .fields()
            .iter()
            .filter(|(name, _)| !entry.computed.iter().any(|(column, _)| column == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let stored = Record::with_fields(record.id().clone(), fields);

        let slot = entry
            .records
            .iter_mut()
            .find(|existing| existing.record.id() == record.id())
            .ok_or_else(|| ServiceError::RowNotFound(record.id().clone()))?;
        slot.record = stored.clone();
        Ok(entry.enrich(&stored))
    }

    async fn bulk_delete(&self, table: &TableId, records: &[Record]) -> Result<(), ServiceError> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| ServiceError::TableNotFound(table.clone()))?;

        entry
            .records
            .retain(|stored| !records.iter().any(|record| record.id() == stored.record.id()));
        Ok(())
    }
}
