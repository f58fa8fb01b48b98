//! Reactive state core for a paginated, editable data grid.
//!
//! The crate keeps a windowed view of remote table rows in sync with user
//! edits, and keeps focus, hover and selection state pointing only at rows
//! that still exist.
//!
//! - [`rows::RowStore`] owns the ordered row collection and the schema. It
//!   drives paginated fetches, optimistic writes and single-row reconciliation
//!   against a [`service::TableService`].
//! - [`ui::UiStore`] owns focus, hover, selection and row density, and repairs
//!   them whenever the row collection changes.
//! - [`Grid`] wires both together for one grid instance.

pub mod api;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod rows;
pub mod service;
pub mod signal;
pub mod ui;

mod config;
mod grid;

pub use config::*;
pub use error::Error;
pub use grid::*;
