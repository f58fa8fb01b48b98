//! Focus and selection invariant engine
//!
//! [`UiStore`] owns the interaction state of one grid: the focused cell, the
//! hovered row, the selected rows and the row display density. Every row ID it
//! holds names a loaded row or the pending new row. Whenever the row
//! collection changes, stale references are pruned in a single write.

mod cell;
mod density;
mod state;
mod store;

pub use cell::*;
pub use density::*;
pub use state::*;
pub use store::*;
