//! Identity cache for deduplicating incremental page loads

mod identity;

pub use identity::*;
