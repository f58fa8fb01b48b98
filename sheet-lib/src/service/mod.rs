//! Remote table service abstraction
//!
//! The grid never talks to a transport directly. Everything it needs from the
//! backend goes through [`TableService`], so the same engine runs against an
//! HTTP backend, a local database or the bundled [`InMemoryTableService`].

mod memory;

pub use memory::*;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::query::Page;
use crate::api::query::SearchRequest;
use crate::error::ServiceError;
use crate::model::Record;
use crate::model::TableDefinition;
use crate::model::TableId;
use crate::model::Value;

/// Trait for remote table backends.
///
/// Implementations must be cheap to share behind an `Arc`; the grid holds one
/// instance for its whole lifetime and issues requests from any task.
///
/// # Example
///
/// ```ignore
/// use sheet_lib::api::query::SearchRequest;
/// use sheet_lib::service::{InMemoryTableService, TableService};
///
/// let service = InMemoryTableService::new();
/// let page = service.search(SearchRequest::new("ta_users".into(), 100)).await?;
/// for record in page.records() {
///     println!("{}", record.id());
/// }
/// ```
#[async_trait]
pub trait TableService: Send + Sync {
    /// Fetches the table definition (schema and primary display column).
    async fn definition(&self, table: &TableId) -> Result<TableDefinition, ServiceError>;

    /// Creates a row. The returned record may lack enriched relationship data.
    async fn create(&self, table: &TableId, fields: HashMap<String, Value>) -> Result<Record, ServiceError>;

    /// Searches rows.
    async fn search(&self, request: SearchRequest) -> Result<Page, ServiceError>;

    /// Persists a full row and returns the stored version.
    async fn save(&self, table: &TableId, record: &Record) -> Result<Record, ServiceError>;

    /// Deletes rows in bulk.
    async fn bulk_delete(&self, table: &TableId, records: &[Record]) -> Result<(), ServiceError>;
}
