//! Store implementations.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;
pub(crate) use sqlite::UNTAGGED_CONCEPT;
