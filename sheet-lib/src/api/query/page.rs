//! Search request and page types for paginated results.

use serde::Deserialize;
use serde::Serialize;

use super::Filter;
use super::SortOrder;
use crate::model::Record;
use crate::model::RowId;
use crate::model::TableId;

/// Opaque continuation token returned by the service for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmark(String);

impl Bookmark {
    /// Creates a bookmark from a service-provided token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single search round trip against a table.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The table to search.
    pub table: TableId,
    /// Structured filter, `None` matches every row.
    pub filter: Option<Filter>,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Whether the service should return a bookmark for the next page.
    pub paginate: bool,
    /// Where to resume, `None` for the first page.
    pub bookmark: Option<Bookmark>,
    /// Optional ordering.
    pub sort: Option<SortOrder>,
}

impl SearchRequest {
    /// Creates a paginated search for the first page of a table.
    pub fn new(table: TableId, limit: usize) -> Self {
        Self {
            table,
            filter: None,
            limit,
            paginate: true,
            bookmark: None,
            sort: None,
        }
    }

    /// Creates an unpaginated lookup of a single row by ID.
    pub fn by_id(table: TableId, id: &RowId, limit: usize) -> Self {
        Self {
            table,
            filter: Some(Filter::id(id.clone())),
            limit,
            paginate: false,
            bookmark: None,
            sort: None,
        }
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the bookmark to resume from.
    pub fn with_bookmark(mut self, bookmark: Option<Bookmark>) -> Self {
        self.bookmark = bookmark;
        self
    }

    /// Sets the ordering.
    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }
}

/// A page of search results with pagination information.
#[derive(Debug, Clone, Default)]
pub struct Page {
    records: Vec<Record>,
    /// Token for fetching the next page.
    bookmark: Option<Bookmark>,
    /// Whether the service reports more rows after this page.
    has_next_page: bool,
}

impl Page {
    /// Creates a final page (no further pages).
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            bookmark: None,
            has_next_page: false,
        }
    }

    /// Marks that another page is available at the given bookmark.
    pub fn with_next(mut self, bookmark: Bookmark) -> Self {
        self.bookmark = Some(bookmark);
        self.has_next_page = true;
        self
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the bookmark for the next page, if available.
    pub fn bookmark(&self) -> Option<&Bookmark> {
        self.bookmark.as_ref()
    }

    /// Returns `true` if there are more pages available.
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Splits the page into its records and next-page information.
    pub fn into_parts(self) -> (Vec<Record>, Option<Bookmark>, bool) {
        (self.records, self.bookmark, self.has_next_page)
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
