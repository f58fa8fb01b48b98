//! Row, schema and value models

mod id;
mod record;
mod row_set;
mod schema;
mod value;

pub use id::*;
pub use record::*;
pub use row_set::*;
pub use schema::*;
pub use value::*;
