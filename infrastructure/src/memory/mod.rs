//! Memory store adapters.
//!
//! - [`InMemoryStore`] keeps entries for the lifetime of the process
//! - [`FileMemoryStore`] persists a JSON snapshot after every mutation
//! - `RedisMemoryStore` shares entries through a Redis server (feature `redis-memory`)

#[cfg(test)]
mod conformance;
mod file;
mod in_memory;
#[cfg(feature = "redis-memory")]
mod redis;
mod table;

pub use file::FileMemoryStore;
pub use in_memory::InMemoryStore;
#[cfg(feature = "redis-memory")]
pub use redis::{DEFAULT_KEY_PREFIX, RedisMemoryConfig, RedisMemoryStore};
