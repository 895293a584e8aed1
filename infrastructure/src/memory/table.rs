//! Key-indexed memory table shared by the store adapters.
//!
//! Expired entries may linger in the map until purged; every read treats
//! them as absent.

use agentloop_domain::{DomainError, Memory, MemoryQuery, SetOptions};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryTable {
    entries: HashMap<String, Memory>,
}

impl MemoryTable {
    pub(crate) fn from_entries(entries: impl IntoIterator<Item = Memory>) -> Self {
        Self {
            entries: entries.into_iter().map(|m| (m.key.clone(), m)).collect(),
        }
    }

    /// Replace whatever lives under `key` with a fresh entry.
    pub(crate) fn set(
        &mut self,
        key: &str,
        value: serde_json::Value,
        options: SetOptions,
        now: DateTime<Utc>,
    ) -> Result<Memory, DomainError> {
        let memory = Memory::create(key, value, options, now)?;
        self.entries.insert(memory.key.clone(), memory.clone());
        Ok(memory)
    }

    pub(crate) fn get(&self, key: &str, now: DateTime<Utc>) -> Option<Memory> {
        self.entries.get(key).filter(|m| m.is_live_at(now)).cloned()
    }

    pub(crate) fn search(&self, query: &MemoryQuery, now: DateTime<Utc>) -> Vec<Memory> {
        query.apply(self.entries.values().filter(|m| m.is_live_at(now)).cloned())
    }

    /// Returns `true` only if a live entry was removed.
    pub(crate) fn delete(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .remove(key)
            .is_some_and(|m| m.is_live_at(now))
    }

    /// Remove everything, or only entries carrying any of `tags`.
    ///
    /// Returns the number of live entries removed.
    pub(crate) fn clear(&mut self, tags: Option<&[String]>, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, m| {
            let drop = tags.is_none_or(|tags| m.has_any_tag(tags));
            if drop && m.is_live_at(now) {
                removed += 1;
            }
            !drop
        });
        removed
    }

    pub(crate) fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, m| m.is_live_at(now));
        before - self.entries.len()
    }

    /// Entries ordered by key.
    pub(crate) fn snapshot(&self) -> Vec<&Memory> {
        let mut entries: Vec<&Memory> = self.entries.values().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}
