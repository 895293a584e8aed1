//! File-backed memory store.
//!
//! The whole table is persisted as one JSON snapshot after every mutation.
//! Writes go to a sibling temp file that is then renamed over the snapshot,
//! so readers never observe a half-written file.

use super::table::MemoryTable;
use agentloop_application::ports::memory_store::{MemoryError, MemoryStore};
use agentloop_domain::{Memory, MemoryQuery, SetOptions};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Snapshot {
    #[allow(dead_code)]
    version: u32,
    memories: Vec<Memory>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    memories: Vec<&'a Memory>,
}

/// Memory store persisted to a JSON file.
pub struct FileMemoryStore {
    path: PathBuf,
    table: Mutex<MemoryTable>,
}

impl FileMemoryStore {
    /// Open the store at `path`, loading an existing snapshot if present.
    ///
    /// Entries that expired while the process was down are dropped on load.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();

        let table = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let snapshot: Snapshot = serde_json::from_str(&contents).map_err(|e| {
                    MemoryError::Serialization(format!("{}: {}", path.display(), e))
                })?;
                MemoryTable::from_entries(snapshot.memories)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryTable::default(),
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let store = Self {
            path,
            table: Mutex::new(table),
        };

        let mut table = store.table.lock().await;
        let purged = table.purge_expired(Utc::now());
        if purged > 0 {
            info!(purged, path = %store.path.display(), "Dropped expired memories on load");
            store.persist(&table).await?;
        }
        drop(table);

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &MemoryTable) -> Result<(), MemoryError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            memories: table.snapshot(),
        };
        let contents = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| MemoryError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory", parent, e))?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| storage_error("write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;

        debug!(path = %self.path.display(), "Persisted memory snapshot");
        Ok(())
    }

    /// Apply `change` to a copy of the table and keep it only once the copy
    /// is on disk. A failed write leaves memory and file untouched.
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut MemoryTable) -> Result<T, MemoryError>,
    ) -> Result<T, MemoryError> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let outcome = change(&mut staged)?;
        self.persist(&staged).await?;
        *table = staged;
        Ok(outcome)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "memory.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_error(op: &str, path: &Path, e: std::io::Error) -> MemoryError {
    MemoryError::Storage(format!("Failed to {} {}: {}", op, path.display(), e))
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        options: SetOptions,
    ) -> Result<Memory, MemoryError> {
        self.commit(|table| Ok(table.set(key, value, options, Utc::now())?))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<Memory>, MemoryError> {
        Ok(self.table.lock().await.get(key, Utc::now()))
    }

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        Ok(self.table.lock().await.search(query, Utc::now()))
    }

    async fn delete(&self, key: &str) -> Result<bool, MemoryError> {
        self.commit(|table| Ok(table.delete(key, Utc::now()))).await
    }

    async fn clear(&self, tags: Option<&[String]>) -> Result<usize, MemoryError> {
        self.commit(|table| Ok(table.clear(tags, Utc::now()))).await
    }

    async fn purge_expired(&self) -> Result<usize, MemoryError> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let purged = staged.purge_expired(Utc::now());
        if purged > 0 {
            self.persist(&staged).await?;
            *table = staged;
        }
        Ok(purged)
    }
}
