//! Structured queries against a remote table.
//!
//! - [`Filter`] - Structured predicate understood by the table service
//! - [`FilterExpression`] - User-facing filter configuration, compiled into a [`Filter`]
//! - [`SortOrder`] - Ordering of search results
//! - [`SearchRequest`] / [`Page`] - One paginated search round trip

mod expression;
mod filter;
mod order;
mod page;

pub use expression::FilterCondition;
pub use expression::FilterExpression;
pub use expression::FilterOperator;
pub use filter::Filter;
pub use order::Direction;
pub use order::SortOrder;
pub use page::Bookmark;
pub use page::Page;
pub use page::SearchRequest;
