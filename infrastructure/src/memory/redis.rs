//! Redis-backed memory store (feature `redis-memory`).
//!
//! Key layout under the configured prefix:
//!
//! ```text
//! <prefix>entry:<key>   JSON-encoded Memory, PX expiry when it has one
//! <prefix>tag:<tag>     set of keys carrying <tag>
//! <prefix>index         set of every key written
//! ```
//!
//! Each write runs as one MULTI/EXEC pipeline, so readers see the old entry
//! or the new one, never a mix. Index sets may hold keys whose entry already
//! expired; reads resolve every candidate against its entry and recheck
//! liveness and tags, and `purge_expired` prunes the leftovers.

use agentloop_application::ports::memory_store::{MemoryError, MemoryStore};
use agentloop_domain::{Memory, MemoryQuery, SetOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_KEY_PREFIX: &str = "agentloop:memory:";

/// Connection settings for [`RedisMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisMemoryConfig {
    pub url: String,
    pub key_prefix: String,
    /// Expiry applied to entries written without one.
    pub default_ttl: Option<Duration>,
}

impl RedisMemoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }
}

#[derive(Debug, Clone)]
struct KeySpace {
    prefix: String,
}

impl KeySpace {
    fn entry(&self, key: &str) -> String {
        format!("{}entry:{}", self.prefix, key)
    }

    fn tag(&self, tag: &str) -> String {
        format!("{}tag:{}", self.prefix, tag)
    }

    fn index(&self) -> String {
        format!("{}index", self.prefix)
    }
}

/// Memory store shared through a Redis server.
pub struct RedisMemoryStore {
    conn: MultiplexedConnection,
    keys: KeySpace,
    default_ttl: Option<chrono::Duration>,
}

impl RedisMemoryStore {
    pub async fn connect(config: RedisMemoryConfig) -> Result<Self, MemoryError> {
        let default_ttl = config
            .default_ttl
            .map(chrono::Duration::from_std)
            .transpose()
            .map_err(|e| MemoryError::Storage(format!("Invalid default TTL: {}", e)))?;

        let client = redis::Client::open(config.url.as_str()).map_err(storage_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_error)?;
        info!(prefix = %config.key_prefix, "Connected to Redis memory store");

        Ok(Self {
            conn,
            keys: KeySpace {
                prefix: config.key_prefix,
            },
            default_ttl,
        })
    }

    /// Entries for `keys`, in order. Missing or undecodable entries are `None`.
    async fn load_many(&self, keys: &[String]) -> Result<Vec<Option<Memory>>, MemoryError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let entry_keys: Vec<String> = keys.iter().map(|k| self.keys.entry(k)).collect();
        let mut conn = self.conn.clone();
        let raw: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&entry_keys)
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;
        Ok(raw
            .into_iter()
            .zip(keys)
            .map(|(raw, key)| raw.and_then(|json| decode(key, &json)))
            .collect())
    }

    async fn load(&self, key: &str) -> Result<Option<Memory>, MemoryError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.keys.entry(key)).await.map_err(storage_error)?;
        Ok(raw.and_then(|json| decode(key, &json)))
    }

    /// Keys that may match `tags` (any of them), or every known key.
    async fn candidates(&self, tags: Option<&[String]>) -> Result<Vec<String>, MemoryError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = match tags {
            Some(tags) if !tags.is_empty() => {
                let tag_keys: Vec<String> = tags.iter().map(|t| self.keys.tag(t)).collect();
                conn.sunion(tag_keys).await.map_err(storage_error)?
            }
            _ => conn.smembers(self.keys.index()).await.map_err(storage_error)?,
        };
        Ok(keys)
    }

    /// Delete entries and drop them from the index and their tag sets, atomically.
    async fn remove_all(&self, removals: &[(String, Option<Memory>)]) -> Result<(), MemoryError> {
        if removals.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, memory) in removals {
            pipe.del(self.keys.entry(key)).ignore();
            pipe.srem(self.keys.index(), key).ignore();
            for tag in memory.iter().flat_map(|m| &m.metadata.tags) {
                pipe.srem(self.keys.tag(tag), key).ignore();
            }
        }
        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await.map_err(storage_error)?;
        Ok(())
    }
}

fn storage_error(e: redis::RedisError) -> MemoryError {
    MemoryError::Storage(format!("Redis: {}", e))
}

fn decode(key: &str, json: &str) -> Option<Memory> {
    match serde_json::from_str(json) {
        Ok(memory) => Some(memory),
        Err(e) => {
            warn!(key, "Ignoring undecodable memory entry: {}", e);
            None
        }
    }
}

/// Fill in the store's default expiry when the caller gave none.
fn with_default_expiry(
    mut options: SetOptions,
    default_ttl: Option<chrono::Duration>,
    now: DateTime<Utc>,
) -> SetOptions {
    if options.expires_at.is_none()
        && let Some(ttl) = default_ttl
    {
        options.expires_at = Some(now + ttl);
    }
    options
}

/// Milliseconds until `expires_at`, at least 1 so Redis accepts it.
fn ttl_millis(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((expires_at - now).num_milliseconds())
        .unwrap_or(0)
        .max(1)
}

#[async_trait]
impl MemoryStore for RedisMemoryStore {
    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        options: SetOptions,
    ) -> Result<Memory, MemoryError> {
        let now = Utc::now();
        let options = with_default_expiry(options, self.default_ttl, now);
        let memory = Memory::create(key, value, options, now)?;
        let payload = serde_json::to_string(&memory)
            .map_err(|e| MemoryError::Serialization(e.to_string()))?;
        let previous = self.load(&memory.key).await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for tag in previous.iter().flat_map(|m| &m.metadata.tags) {
            pipe.srem(self.keys.tag(tag), &memory.key).ignore();
        }
        let entry_key = self.keys.entry(&memory.key);
        match memory.metadata.expires_at {
            Some(at) => {
                pipe.pset_ex(&entry_key, &payload, ttl_millis(at, now)).ignore();
            }
            None => {
                pipe.set(&entry_key, &payload).ignore();
            }
        }
        pipe.sadd(self.keys.index(), &memory.key).ignore();
        for tag in &memory.metadata.tags {
            pipe.sadd(self.keys.tag(tag), &memory.key).ignore();
        }

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await.map_err(storage_error)?;
        debug!(key = %memory.key, id = %memory.id.as_str(), "Stored memory in Redis");
        Ok(memory)
    }

    async fn get(&self, key: &str) -> Result<Option<Memory>, MemoryError> {
        let now = Utc::now();
        Ok(self.load(key).await?.filter(|m| m.is_live_at(now)))
    }

    async fn search(&self, query: &MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
        let tags = (!query.tags.is_empty()).then_some(query.tags.as_slice());
        let keys = self.candidates(tags).await?;
        let now = Utc::now();
        let live = self
            .load_many(&keys)
            .await?
            .into_iter()
            .flatten()
            .filter(|m| m.is_live_at(now));
        Ok(query.apply(live))
    }

    async fn delete(&self, key: &str) -> Result<bool, MemoryError> {
        let existing = self.load(key).await?;
        let was_live = existing.as_ref().is_some_and(|m| m.is_live_at(Utc::now()));
        self.remove_all(&[(key.to_string(), existing)]).await?;
        Ok(was_live)
    }

    async fn clear(&self, tags: Option<&[String]>) -> Result<usize, MemoryError> {
        let keys = self.candidates(tags).await?;
        let now = Utc::now();
        let mut removed = 0;
        let mut removals = Vec::new();
        for (key, memory) in keys.iter().zip(self.load_many(&keys).await?) {
            let selected = match (&memory, tags) {
                (Some(m), Some(tags)) => m.has_any_tag(tags),
                // Stale index entry: nothing left to match against
                (None, Some(_)) => false,
                (_, None) => true,
            };
            if !selected {
                continue;
            }
            if memory.as_ref().is_some_and(|m| m.is_live_at(now)) {
                removed += 1;
            }
            removals.push((key.clone(), memory));
        }
        self.remove_all(&removals).await?;
        Ok(removed)
    }

    async fn purge_expired(&self) -> Result<usize, MemoryError> {
        let keys = self.candidates(None).await?;
        let now = Utc::now();
        let expired: Vec<(String, Option<Memory>)> = keys
            .iter()
            .zip(self.load_many(&keys).await?)
            .filter(|(_, memory)| !memory.as_ref().is_some_and(|m| m.is_live_at(now)))
            .map(|(key, memory)| (key.clone(), memory))
            .collect();
        self.remove_all(&expired).await?;
        if !expired.is_empty() {
            debug!(purged = expired.len(), "Purged expired memories from Redis");
        }
        Ok(expired.len())
    }
}
