//! Process-local memory store.

use super::table::MemoryTable;
use agentloop_application::ports::memory_store::{MemoryError, MemoryStore};
use agentloop_domain::{Memory, MemoryQuery, SetOptions};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

/// Memory store backed by a `RwLock<HashMap>`. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<MemoryTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        options: SetOptions,
    ) -> Result<Memory, MemoryError> {
        let memory = self.table.write().await.set(key, value, options, Utc::now())?;
        debug!(key = %memory.key, id = %memory.id.as_str(), "Stored memory");
        Ok(memory)
    }

    async fn get(&self, key: &str) -> Result<Option<Memory>, MemoryError> {
        Ok(self.table.read().await.get(key, Utc::now()))
    }

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        Ok(self.table.read().await.search(query, Utc::now()))
    }

    async fn delete(&self, key: &str) -> Result<bool, MemoryError> {
        Ok(self.table.write().await.delete(key, Utc::now()))
    }

    async fn clear(&self, tags: Option<&[String]>) -> Result<usize, MemoryError> {
        Ok(self.table.write().await.clear(tags, Utc::now()))
    }

    async fn purge_expired(&self) -> Result<usize, MemoryError> {
        let purged = self.table.write().await.purge_expired(Utc::now());
        if purged > 0 {
            debug!(purged, "Purged expired memories");
        }
        Ok(purged)
    }
}
