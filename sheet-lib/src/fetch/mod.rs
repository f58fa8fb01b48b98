//! Fetch context and paginated fetch pipeline

mod context;
mod pipeline;

pub use context::*;
pub use pipeline::*;
