//! Memory entities - keyed, tagged, optionally expiring facts.

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque generated identifier (`mem_<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(String);

impl MemoryId {
    pub fn generate() -> Self {
        Self(format!("mem_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form caller annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

/// A stored fact.
///
/// At most one live entry exists per key; a `set` on an existing key
/// replaces value and metadata wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub key: String,
    pub value: serde_json::Value,
    pub metadata: MemoryMetadata,
}

impl Memory {
    /// Build a fresh entry, rejecting empty keys and non-future expiry.
    pub fn create(
        key: impl Into<String>,
        value: serde_json::Value,
        options: SetOptions,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DomainError::EmptyMemoryKey);
        }
        if let Some(expires_at) = options.expires_at
            && expires_at <= now
        {
            return Err(DomainError::ExpiryInPast);
        }

        let mut tags = Vec::new();
        for tag in options.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self {
            id: MemoryId::generate(),
            key,
            value,
            metadata: MemoryMetadata {
                created_at: now,
                updated_at: now,
                expires_at: options.expires_at,
                tags,
                annotations: options.annotations,
            },
        })
    }

    /// Live iff there is no expiry or the expiry is strictly after `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.metadata.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.metadata.tags.iter().any(|t| t == tag)
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.has_tag(t))
    }
}

/// Options for `set`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetOptions {
    pub tags: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub annotations: BTreeMap<String, serde_json::Value>,
}

impl SetOptions {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn expires_in(self, ttl: chrono::Duration) -> Self {
        self.expires_at(Utc::now() + ttl)
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }
}
