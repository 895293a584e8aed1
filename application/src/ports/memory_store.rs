//! Memory store port
//!
//! Backends must agree on semantics: at most one live entry per key, `set`
//! replaces wholesale, reads never return expired entries, and a writer's
//! update is atomic with respect to readers.

use agentloop_domain::{DomainError, Memory, MemoryQuery, SetOptions};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Insert or fully replace the entry for `key`
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        options: SetOptions,
    ) -> Result<Memory, MemoryError>;

    /// Live entry for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Memory>, MemoryError>;

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<Memory>, MemoryError>;

    /// Returns whether an entry was removed
    async fn delete(&self, key: &str) -> Result<bool, MemoryError>;

    /// Remove every entry, or only those carrying one of `tags`. Returns the count removed.
    async fn clear(&self, tags: Option<&[String]>) -> Result<usize, MemoryError>;

    /// Drop expired entries. Returns the count removed.
    async fn purge_expired(&self) -> Result<usize, MemoryError>;
}
