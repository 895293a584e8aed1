//! Memory search criteria

use super::entities::Memory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Search filter; every set criterion must match.
///
/// - `query`: case-insensitive substring of the key or the JSON-encoded value
/// - `tags`: entry carries at least one of them
/// - `after` / `before`: inclusive bounds on `created_at`
/// - `limit`: applied after ordering by `created_at`, then key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryQuery {
    pub query: Option<String>,
    pub tags: Vec<String>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl MemoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn before(mut self, at: DateTime<Utc>) -> Self {
        self.before = Some(at);
        self
    }

    pub fn after(mut self, at: DateTime<Utc>) -> Self {
        self.after = Some(at);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a single entry passes the filter. Liveness is the store's job.
    pub fn matches(&self, memory: &Memory) -> bool {
        if !self.tags.is_empty() && !memory.has_any_tag(&self.tags) {
            return false;
        }
        if let Some(after) = self.after
            && memory.metadata.created_at < after
        {
            return false;
        }
        if let Some(before) = self.before
            && memory.metadata.created_at > before
        {
            return false;
        }
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_key = memory.key.to_lowercase().contains(&needle);
            if !in_key && !memory.value.to_string().to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Filter, order and truncate a candidate set.
    pub fn apply<I>(&self, candidates: I) -> Vec<Memory>
    where
        I: IntoIterator<Item = Memory>,
    {
        let mut results: Vec<Memory> = candidates.into_iter().filter(|m| self.matches(m)).collect();
        results.sort_by(|a, b| {
            a.metadata
                .created_at
                .cmp(&b.metadata.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }
}
