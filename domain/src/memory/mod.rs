//! Memory: keyed, tag-indexed, optionally expiring facts shared across iterations.

pub mod entities;
pub mod query;

pub use entities::{Memory, MemoryId, MemoryMetadata, SetOptions};
pub use query::MemoryQuery;
