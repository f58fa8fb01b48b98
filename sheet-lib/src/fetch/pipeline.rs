//! Paginated fetch pipeline for one fetch context.

use crate::api::query::Bookmark;
use crate::api::query::Filter;
use crate::api::query::Page;
use crate::api::query::SearchRequest;
use crate::api::query::SortOrder;
use crate::error::ServiceError;
use crate::model::Record;
use crate::model::Schema;
use crate::model::TableDefinition;
use crate::model::TableId;
use crate::service::TableService;

/// Rows (and, for the first page, the schema) delivered by one page fetch.
#[derive(Debug, Clone, Default)]
pub struct LoadedPage {
    /// Rows in server order.
    pub records: Vec<Record>,
    /// Schema of the table, present on the first page.
    pub schema: Option<Schema>,
    /// Primary display column declared by the table definition.
    pub primary_display: Option<String>,
    /// Whether this is the first page of its context.
    pub is_first_page: bool,
    /// Whether the service reports another page.
    pub has_next_page: bool,
    /// Where the next page starts.
    pub bookmark: Option<Bookmark>,
}

impl LoadedPage {
    /// Builds the first page of a context from the table definition and a search page.
    pub fn first(definition: TableDefinition, page: Page) -> Self {
        let (records, bookmark, has_next_page) = page.into_parts();
        Self {
            records,
            schema: Some(definition.schema),
            primary_display: definition.primary_display,
            is_first_page: true,
            has_next_page,
            bookmark,
        }
    }

    /// Builds a subsequent page.
    pub fn next(page: Page) -> Self {
        let (records, bookmark, has_next_page) = page.into_parts();
        Self {
            records,
            schema: None,
            primary_display: None,
            is_first_page: false,
            has_next_page,
            bookmark,
        }
    }
}

/// A page fetch ready to be sent, detached from the pipeline so no lock is
/// held while it is in flight.
#[derive(Debug, Clone)]
pub struct PageRequest {
    search: SearchRequest,
    first: bool,
}

impl PageRequest {
    /// Returns `true` if this request loads the first page.
    pub fn is_first_page(&self) -> bool {
        self.first
    }

    /// Executes the request. The first page also fetches the table definition.
    pub async fn execute(self, service: &dyn TableService) -> Result<LoadedPage, ServiceError> {
        if self.first {
            let definition = service.definition(&self.search.table).await?;
            let page = service.search(self.search).await?;
            Ok(LoadedPage::first(definition, page))
        } else {
            let page = service.search(self.search).await?;
            Ok(LoadedPage::next(page))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    Unloaded,
    Loaded {
        bookmark: Option<Bookmark>,
        has_next_page: bool,
    },
}

/// Pagination state for one (table, filter) pair.
///
/// At most one page request is in flight at a time.
#[derive(Debug, Clone)]
pub struct PagedFetch {
    table: TableId,
    filter: Option<Filter>,
    page_size: usize,
    sort: Option<SortOrder>,
    cursor: Cursor,
    in_flight: bool,
}

impl PagedFetch {
    /// Opens a pipeline. Nothing is fetched until [`PagedFetch::begin`] is called.
    pub fn open(table: TableId, filter: Option<Filter>, page_size: usize, sort: Option<SortOrder>) -> Self {
        Self {
            table,
            filter,
            page_size,
            sort,
            cursor: Cursor::Unloaded,
            in_flight: false,
        }
    }

    /// Returns the table this pipeline loads from.
    pub fn table(&self) -> &TableId {
        &self.table
    }

    /// Returns `true` once the first page has been applied.
    pub fn is_loaded(&self) -> bool {
        matches!(self.cursor, Cursor::Loaded { .. })
    }

    /// Returns `true` while a page request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Returns `true` if another page is known to exist.
    ///
    /// Before the first page has loaded, the first page itself counts.
    pub fn has_next_page(&self) -> bool {
        match &self.cursor {
            Cursor::Unloaded => true,
            Cursor::Loaded { has_next_page, .. } => *has_next_page,
        }
    }

    /// Starts the next page request.
    ///
    /// Returns `None` when a request is already in flight or no page is left.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if self.in_flight || !self.has_next_page() {
            return None;
        }

        let bookmark = match &self.cursor {
            Cursor::Unloaded => None,
            Cursor::Loaded { bookmark, .. } => bookmark.clone(),
        };
        let search = SearchRequest::new(self.table.clone(), self.page_size)
            .with_filter(self.filter.clone())
            .with_bookmark(bookmark)
            .with_sort(self.sort.clone());

        self.in_flight = true;
        Some(PageRequest {
            search,
            first: self.cursor == Cursor::Unloaded,
        })
    }

    /// Records a delivered page.
    pub fn complete(&mut self, page: &LoadedPage) {
        self.in_flight = false;
        self.cursor = Cursor::Loaded {
            bookmark: page.bookmark.clone(),
            has_next_page: page.has_next_page,
        };
    }

    /// Records a failed request so it can be retried.
    pub fn abort(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch() -> PagedFetch {
        PagedFetch::open(TableId::new("ta_1"), None, 10, None)
    }

    #[test]
    fn test_first_request_has_no_bookmark() {
        let mut fetch = fetch();
        assert!(fetch.has_next_page());

        let request = fetch.begin().unwrap();
        assert!(request.is_first_page());
        assert!(fetch.is_loading());
        assert!(fetch.begin().is_none(), "only one request in flight");
    }

    #[test]
    fn test_next_request_uses_bookmark() {
        let mut fetch = fetch();
        fetch.begin();
        fetch.complete(&LoadedPage {
            is_first_page: true,
            has_next_page: true,
            bookmark: Some(Bookmark::new("10")),
            ..LoadedPage::default()
        });

        let request = fetch.begin().unwrap();
        assert!(!request.is_first_page());
        assert_eq!(request.search.bookmark, Some(Bookmark::new("10")));
    }

    #[test]
    fn test_exhausted_pipeline() {
        let mut fetch = fetch();
        fetch.begin();
        fetch.complete(&LoadedPage::default());

        assert!(fetch.is_loaded());
        assert!(!fetch.has_next_page());
        assert!(fetch.begin().is_none());
    }

    #[test]
    fn test_abort_allows_retry() {
        let mut fetch = fetch();
        fetch.begin();
        fetch.abort();

        assert!(fetch.begin().unwrap().is_first_page());
    }
}
