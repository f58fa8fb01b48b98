//! Row data synchronization engine
//!
//! [`RowStore`] owns the ordered row collection and the schema of the active
//! fetch context. It is the only writer of either: consumers read through
//! [`ReadSignal`](crate::signal::ReadSignal) handles and request changes
//! through the async operations below.
//!
//! | Operation | Remote calls | Local effect |
//! |-----------|--------------|--------------|
//! | [`configure`](RowStore::configure) | definition + first page | reset, then hydrate |
//! | [`load_next_page`](RowStore::load_next_page) | search | dedup-append |
//! | [`add_row`](RowStore::add_row) | create + search by id | dedup-append |
//! | [`update_row`](RowStore::update_row) | save + search by id | optimistic write, then reconcile |
//! | [`refresh_row`](RowStore::refresh_row) | search by id | replace, append or remove |
//! | [`delete_rows`](RowStore::delete_rows) | bulk delete | remove, backfill if empty |

mod reconcile;
mod store;

pub use reconcile::*;
pub use store::*;
