//! LanceDB-backed per-user vector index.

pub mod index;
pub mod schema;
pub mod table;

pub use index::UserVectorIndex;
