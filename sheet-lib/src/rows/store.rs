//! The row store

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use dashmap::DashMap;
use log::debug;
use log::trace;
use log::warn;

use super::Reconciled;
use crate::api::query::SearchRequest;
use crate::cache::IdentityCache;
use crate::config::GridConfig;
use crate::error::Error;
use crate::fetch::ContextToken;
use crate::fetch::FetchContext;
use crate::fetch::LoadedPage;
use crate::fetch::PagedFetch;
use crate::model::Record;
use crate::model::Row;
use crate::model::RowId;
use crate::model::RowSet;
use crate::model::Schema;
use crate::model::TableId;
use crate::model::Value;
use crate::notify::Notifier;
use crate::service::TableService;
use crate::signal::ReadSignal;
use crate::signal::Signal;

/// Synchronizes a local, ordered row collection with a remote table.
///
/// Cloning is cheap and every clone drives the same store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use sheet_lib::fetch::FetchContext;
/// use sheet_lib::model::{Record, Schema, TableDefinition};
/// use sheet_lib::notify::LogNotifier;
/// use sheet_lib::rows::RowStore;
/// use sheet_lib::service::InMemoryTableService;
/// use sheet_lib::GridConfig;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let service = InMemoryTableService::new().with_table(TableDefinition::new("ta_people", Schema::new()));
/// service.insert_records(&"ta_people".into(), [Record::new("ro_1")]);
/// let store = RowStore::new(Arc::new(service), Arc::new(LogNotifier), GridConfig::default()).unwrap();
///
/// store.configure(FetchContext::new("ta_people")).await.unwrap();
/// assert_eq!(store.rows().get().len(), 1);
/// # });
/// ```
#[derive(Clone)]
pub struct RowStore {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn TableService>,
    notifier: Arc<dyn Notifier>,
    config: GridConfig,
    rows: Signal<RowSet>,
    schema: Signal<Schema>,
    state: Mutex<SyncState>,
    save_locks: DashMap<RowId, Arc<tokio::sync::Mutex<()>>>,
}

/// Bookkeeping guarded by one lock. The row and schema signals are only
/// written while this lock is held and only notified after it is released.
#[derive(Default)]
struct SyncState {
    context: FetchContext,
    token: ContextToken,
    hydrated: bool,
    seen: IdentityCache,
    fetch: Option<PagedFetch>,
    edits: HashMap<RowId, u64>,
}

impl RowStore {
    /// Creates an unconfigured store.
    ///
    /// Fails with [`Error::Config`] if `config` has a zero page size or lookup limit.
    pub fn new(service: Arc<dyn TableService>, notifier: Arc<dyn Notifier>, config: GridConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::assemble(service, notifier, config))
    }

    /// Builds a store from a configuration already known to be valid.
    pub(crate) fn assemble(service: Arc<dyn TableService>, notifier: Arc<dyn Notifier>, config: GridConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                notifier,
                config,
                rows: Signal::default(),
                schema: Signal::default(),
                state: Mutex::new(SyncState::default()),
                save_locks: DashMap::new(),
            }),
        }
    }

    /// Read handle to the ordered row collection.
    pub fn rows(&self) -> ReadSignal<RowSet> {
        self.inner.rows.reader()
    }

    /// Read handle to the schema of the current context.
    pub fn schema(&self) -> ReadSignal<Schema> {
        self.inner.schema.reader()
    }

    /// Returns `true` if a row with this ID is loaded.
    pub fn has_row(&self, id: &RowId) -> bool {
        self.inner.rows.with(|rows| rows.contains(id))
    }

    /// Returns a copy of the loaded row with this ID.
    pub fn row(&self, id: &RowId) -> Option<Row> {
        self.inner.rows.with(|rows| rows.row(id).cloned())
    }

    /// The active fetch context.
    pub fn context(&self) -> FetchContext {
        self.state().context.clone()
    }

    /// Token of the active fetch context.
    pub fn token(&self) -> ContextToken {
        self.state().token
    }

    /// Returns `true` once the first page of the current context has been applied.
    pub fn is_hydrated(&self) -> bool {
        self.state().hydrated
    }

    /// Returns `true` if the current context may have more rows to load.
    pub fn has_next_page(&self) -> bool {
        self.state().fetch.as_ref().is_some_and(PagedFetch::has_next_page)
    }

    /// Returns `true` while a page request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().fetch.as_ref().is_some_and(PagedFetch::is_loading)
    }

    /// Points the store at a new fetch context.
    ///
    /// Does nothing if the context equals the current one. Otherwise every
    /// loaded row is dropped, the identity cache is reset, pagination restarts
    /// and the first page is requested.
    pub async fn configure(&self, context: FetchContext) -> Result<(), Error> {
        let (changed, opened) = {
            let mut state = self.state();
            if state.context == context {
                trace!("Fetch context unchanged, skipping reset");
                return Ok(());
            }

            state.token = state.token.next();
            state.hydrated = false;
            state.seen.reset();
            state.edits.clear();
            state.fetch = context
                .datasource_id
                .clone()
                .map(|table| PagedFetch::open(table, context.filter.compile(), self.inner.config.page_size, None));
            debug!(
                "Configured fetch context {} for {:?}",
                state.token,
                context.datasource_id.as_ref().map(TableId::as_str)
            );
            state.context = context;
            self.inner.save_locks.clear();

            let changed = self.inner.rows.modify(|rows| {
                let changed = !rows.is_empty();
                rows.clear();
                changed
            });
            (changed, state.fetch.is_some())
        };

        if changed {
            self.inner.rows.notify();
        }
        if opened {
            self.load_next_page().await
        } else {
            Ok(())
        }
    }

    /// Requests the next page of the current context.
    ///
    /// Returns immediately if nothing is configured, every page has been
    /// loaded, or a page request is already in flight.
    pub async fn load_next_page(&self) -> Result<(), Error> {
        let (token, request) = {
            let mut state = self.state();
            let token = state.token;
            match state.fetch.as_mut().and_then(PagedFetch::begin) {
                Some(request) => (token, request),
                None => return Ok(()),
            }
        };

        debug!("Requesting {} page for context {token}", if request.is_first_page() { "first" } else { "next" });
        match request.execute(self.inner.service.as_ref()).await {
            Ok(page) => {
                if self.on_page_loaded(token, page) {
                    Ok(())
                } else {
                    Err(Error::StaleContext)
                }
            }
            Err(err) => {
                let current = {
                    let mut state = self.state();
                    let current = state.token == token;
                    if current && let Some(fetch) = state.fetch.as_mut() {
                        fetch.abort();
                    }
                    current
                };
                if !current {
                    return Err(Error::StaleContext);
                }
                self.report(format!("Error loading rows: {err}"));
                Err(err.into())
            }
        }
    }

    /// Applies a page delivered by the fetch pipeline.
    ///
    /// The first page of a context replaces the schema wholesale and resets
    /// the collection before its rows are appended. Rows already seen in this
    /// context are skipped. Returns `false` if the page belongs to a context
    /// that is no longer current.
    pub fn on_page_loaded(&self, token: ContextToken, page: LoadedPage) -> bool {
        let mut schema_update = None;
        let changed = {
            let mut state = self.state();
            if state.token != token {
                warn!("Discarding page for stale context {token} (current {})", state.token);
                return false;
            }
            if let Some(fetch) = state.fetch.as_mut() {
                fetch.complete(&page);
            }

            let state = &mut *state;
            let mut changed = false;
            if page.is_first_page && !state.hydrated {
                let mut schema = page.schema.unwrap_or_default();
                if let Some(primary) = page.primary_display.as_deref()
                    && !schema.mark_primary_display(primary)
                {
                    warn!("Primary display column {primary} is not in the schema");
                }
                schema_update = Some(schema);

                state.hydrated = true;
                state.seen.reset();
                changed = self.inner.rows.modify(|rows| {
                    let changed = !rows.is_empty();
                    rows.clear();
                    changed
                });
                debug!("Hydrated context {token}");
            }

            let appended = self.append(state, page.records);
            changed || !appended.is_empty()
        };

        if let Some(schema) = schema_update {
            self.inner.schema.set(schema);
        }
        if changed {
            self.inner.rows.notify();
        }
        true
    }

    /// Creates a new row remotely and appends it once the server has enriched it.
    pub async fn add_row(&self) -> Result<Row, Error> {
        let (token, record) = match self.create_enriched().await {
            Ok(created) => created,
            Err(err) => {
                self.report(format!("Error adding row: {err}"));
                return Err(err);
            }
        };

        let id = record.id().clone();
        let (row, changed) = {
            let mut state = self.state();
            if state.token != token {
                warn!("Discarding new row {id} for stale context {token}");
                return Err(Error::StaleContext);
            }
            let mut appended = self.append(&mut state, vec![record]);
            let changed = !appended.is_empty();
            (appended.pop().or_else(|| self.row(&id)), changed)
        };

        if changed {
            self.inner.rows.notify();
        }
        row.ok_or(Error::StaleContext)
    }

    async fn create_enriched(&self) -> Result<(ContextToken, Record), Error> {
        let (token, table) = self.current_table()?;
        let created = self.inner.service.create(&table, HashMap::new()).await?;
        debug!("Created row {} in {table}", created.id());

        let request = SearchRequest::by_id(table, created.id(), self.inner.config.lookup_limit);
        let enriched = self
            .inner
            .service
            .search(request)
            .await?
            .into_records()
            .into_iter()
            .find(|record| record.id() == created.id());
        Ok((token, enriched.unwrap_or(created)))
    }

    /// Writes one cell.
    ///
    /// The local row changes immediately and subscribers are notified before
    /// the save is sent. A failed save is reported and the optimistic value is
    /// kept. Saves for the same row run one at a time and only the latest
    /// edit is reconciled against the server, so the last submitted value wins.
    ///
    /// Returns `None` without contacting the server if the row is not loaded
    /// or already holds `value`. Otherwise returns the row as it stands once
    /// the save has settled.
    pub async fn update_row(&self, id: &RowId, column: &str, value: Value) -> Option<Row> {
        let (token, table, edit, record) = {
            let mut state = self.state();
            let table = state.context.datasource_id.clone()?;

            let mut record = None;
            let changed = self.inner.rows.modify(|rows| {
                let Some(row) = rows.row_mut(id) else {
                    return false;
                };
                if *row.value(column) == value {
                    return false;
                }
                row.set_value(column, value);
                record = Some(row.to_record());
                true
            });
            if !changed {
                trace!("Update of {id}.{column} is a no-op");
                return None;
            }

            let record = record?;
            let edit = state.edits.entry(id.clone()).or_insert(0);
            *edit += 1;
            let edit = *edit;
            (state.token, table, edit, record)
        };
        self.inner.rows.notify();

        let lock = Arc::clone(&*self.inner.save_locks.entry(id.clone()).or_default());
        let _serialized = lock.lock().await;

        if let Err(err) = self.inner.service.save(&table, &record).await {
            warn!("Saving {id} failed: {err}");
            self.report(format!("Error saving row: {err}"));
        }

        let latest = {
            let state = self.state();
            state.token == token && state.edits.get(id) == Some(&edit)
        };
        if latest {
            // Errors are reported by the reconcile path itself.
            let _ = self.reconcile(id, Some(edit)).await;
        } else {
            debug!("Skipping reconcile of {id}, a newer edit or context superseded it");
        }

        self.row(id)
    }

    /// Re-queries one row and brings the local collection in line with the server.
    pub async fn refresh_row(&self, id: &RowId) -> Result<Reconciled, Error> {
        self.reconcile(id, None).await
    }

    async fn reconcile(&self, id: &RowId, edit: Option<u64>) -> Result<Reconciled, Error> {
        let (token, table) = self.current_table()?;
        let request = SearchRequest::by_id(table, id, self.inner.config.lookup_limit);
        let found = match self.inner.service.search(request).await {
            Ok(page) => page.into_records().into_iter().find(|record| record.id() == id),
            Err(err) => {
                self.report(format!("Error refreshing row: {err}"));
                return Err(err.into());
            }
        };

        let (outcome, emptied) = {
            let mut state = self.state();
            if state.token != token {
                warn!("Discarding refresh of {id} for stale context {token}");
                return Err(Error::StaleContext);
            }
            if let Some(edit) = edit
                && state.edits.get(id) != Some(&edit)
            {
                debug!("Discarding refresh of {id}, a newer edit is pending");
                return Ok(Reconciled::Unchanged);
            }

            let state = &mut *state;
            let present = self.inner.rows.with(|rows| rows.contains(id));
            match (found, present) {
                (Some(record), true) => {
                    let mut replaced = None;
                    self.inner.rows.modify(|rows| {
                        replaced = rows.replace(record);
                        replaced.is_some()
                    });
                    (replaced.map_or(Reconciled::Unchanged, Reconciled::Updated), false)
                }
                (Some(record), false) => {
                    let mut appended = self.append(state, vec![record]);
                    (appended.pop().map_or(Reconciled::Unchanged, Reconciled::Inserted), false)
                }
                (None, true) => {
                    let ids = HashSet::from([id.clone()]);
                    let (_, emptied) = self.remove(state, &ids);
                    (Reconciled::Removed(id.clone()), emptied)
                }
                (None, false) => (Reconciled::Unchanged, false),
            }
        };

        trace!("Reconciled {id}: {outcome:?}");
        if outcome.is_change() {
            self.inner.rows.notify();
        }
        if emptied {
            self.backfill().await;
        }
        Ok(outcome)
    }

    /// Deletes rows remotely, then removes them locally.
    ///
    /// Nothing is removed if the delete fails. If the collection ends up
    /// empty the next page is requested.
    pub async fn delete_rows(&self, rows: &[Row]) -> Result<(), Error> {
        if rows.is_empty() {
            return Ok(());
        }
        let (token, table) = match self.current_table() {
            Ok(current) => current,
            Err(err) => {
                self.report(format!("Error deleting rows: {err}"));
                return Err(err);
            }
        };

        let records: Vec<Record> = rows.iter().map(Row::to_record).collect();
        if let Err(err) = self.inner.service.bulk_delete(&table, &records).await {
            self.report(format!("Error deleting rows: {err}"));
            return Err(err.into());
        }
        debug!("Deleted {} rows from {table}", records.len());

        let ids: HashSet<RowId> = rows.iter().map(|row| row.id().clone()).collect();
        let (removed, emptied) = {
            let mut state = self.state();
            if state.token != token {
                warn!("Discarding local removal for stale context {token}");
                return Err(Error::StaleContext);
            }
            self.remove(&mut state, &ids)
        };

        if removed > 0 {
            self.inner.rows.notify();
        }
        if emptied {
            self.backfill().await;
        }
        Ok(())
    }

    /// Appends records not yet seen in this context. Caller notifies.
    fn append(&self, state: &mut SyncState, records: Vec<Record>) -> Vec<Row> {
        let fresh: Vec<Record> = records
            .into_iter()
            .filter(|record| state.seen.mark_seen(record.id().clone()))
            .collect();
        if fresh.is_empty() {
            return Vec::new();
        }

        let mut appended = Vec::new();
        self.inner.rows.modify(|rows| {
            appended = rows.append(fresh);
            true
        });
        trace!("Appended {} rows", appended.len());
        appended
    }

    /// Removes rows and forgets their identities. Caller notifies.
    ///
    /// Returns how many rows were removed and whether that emptied the collection.
    fn remove(&self, state: &mut SyncState, ids: &HashSet<RowId>) -> (usize, bool) {
        for id in ids {
            state.seen.forget(id);
            state.edits.remove(id);
            self.inner.save_locks.remove(id);
        }

        let mut removed = 0;
        let mut empty = false;
        self.inner.rows.modify(|rows| {
            removed = rows.remove(ids);
            empty = rows.is_empty();
            removed > 0
        });
        (removed, removed > 0 && empty)
    }

    async fn backfill(&self) {
        debug!("Row collection emptied, requesting next page");
        if let Err(err) = self.load_next_page().await {
            debug!("Backfill failed: {err}");
        }
    }

    fn current_table(&self) -> Result<(ContextToken, TableId), Error> {
        let state = self.state();
        let table = state.context.datasource_id.clone().ok_or(Error::NotConfigured)?;
        Ok((state.token, table))
    }

    fn report(&self, message: String) {
        self.inner.notifier.error(&message);
    }

    fn state(&self) -> MutexGuard<'_, SyncState> {
        self.inner.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("RowStore")
            .field("context", &state.context)
            .field("token", &state.token)
            .field("hydrated", &state.hydrated)
            .field("rows", &self.inner.rows.with(RowSet::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableDefinition;
    use crate::notify::MemoryNotifier;
    use crate::service::InMemoryTableService;

    fn store(rows: usize) -> RowStore {
        let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Trace, simplelog::Config::default());
        let service = InMemoryTableService::new().with_table(TableDefinition::new("ta_people", Schema::new()));
        service.insert_records(
            &"ta_people".into(),
            (1..=rows).map(|i| Record::new(format!("ro_{i}")).set("name", format!("Person {i}"))),
        );
        RowStore::new(Arc::new(service), Arc::new(MemoryNotifier::new()), GridConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_page_size() {
        let result = RowStore::new(
            Arc::new(InMemoryTableService::new()),
            Arc::new(MemoryNotifier::new()),
            GridConfig::default().with_page_size(0),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_deleting_a_row_drops_its_save_lock() {
        let store = store(2);
        store.configure(FetchContext::new("ta_people")).await.unwrap();

        store.update_row(&RowId::new("ro_1"), "name", Value::from("Ada")).await.unwrap();
        store.update_row(&RowId::new("ro_2"), "name", Value::from("Grace")).await.unwrap();
        assert_eq!(store.inner.save_locks.len(), 2);

        let row = store.row(&RowId::new("ro_1")).unwrap();
        store.delete_rows(&[row]).await.unwrap();

        assert!(!store.inner.save_locks.contains_key(&RowId::new("ro_1")));
        assert_eq!(store.inner.save_locks.len(), 1);
    }

    #[tokio::test]
    async fn test_vanished_row_drops_its_save_lock() {
        let store = store(2);
        store.configure(FetchContext::new("ta_people")).await.unwrap();
        store.update_row(&RowId::new("ro_2"), "name", Value::from("Grace")).await.unwrap();

        let row = store.row(&RowId::new("ro_1")).unwrap();
        let service = Arc::clone(&store.inner.service);
        service.bulk_delete(&"ta_people".into(), &[row.to_record()]).await.unwrap();
        // The save fails and the reconcile that follows removes the row.
        assert_eq!(store.update_row(&RowId::new("ro_1"), "name", Value::from("Ada")).await, None);

        assert!(!store.has_row(&RowId::new("ro_1")));
        assert!(!store.inner.save_locks.contains_key(&RowId::new("ro_1")));
        assert_eq!(store.inner.save_locks.len(), 1);
    }
}
