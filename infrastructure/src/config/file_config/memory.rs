//! Memory configuration from TOML (`[memory]` section)

use agentloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw memory configuration from TOML
///
/// # Example
///
/// ```toml
/// [memory]
/// backend = "file"             # "memory", "file" or "redis"
/// path = ".agentloop/memory.json"
/// record_observations = true
///
/// # redis backend only
/// url = "redis://127.0.0.1/"
/// key_prefix = "agentloop:memory:"
/// default_ttl_secs = 86400
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub backend: String,
    pub path: Option<String>,
    pub record_observations: bool,
    pub url: Option<String>,
    pub key_prefix: Option<String>,
    pub default_ttl_secs: Option<u64>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
            record_observations: true,
            url: None,
            key_prefix: None,
            default_ttl_secs: None,
        }
    }
}

/// Resolved memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryBackend {
    InMemory,
    File(PathBuf),
    Redis {
        url: String,
        key_prefix: Option<String>,
        default_ttl: Option<Duration>,
    },
}

impl FileMemoryConfig {
    pub fn parse_backend(&self) -> (MemoryBackend, Vec<ConfigIssue>) {
        match self.backend.to_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => (MemoryBackend::InMemory, vec![]),
            "file" => (MemoryBackend::File(self.file_path()), vec![]),
            "redis" => self.redis_backend(),
            _ => (
                MemoryBackend::InMemory,
                vec![ConfigIssue::invalid_enum(
                    "memory.backend",
                    &self.backend,
                    &["memory", "file", "redis"],
                    "memory",
                )],
            ),
        }
    }

    fn redis_backend(&self) -> (MemoryBackend, Vec<ConfigIssue>) {
        let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return (
                MemoryBackend::InMemory,
                vec![ConfigIssue::invalid_value(
                    "memory.url",
                    "required when backend is \"redis\"",
                )],
            );
        };
        let mut issues = Vec::new();
        let default_ttl = match self.default_ttl_secs {
            Some(0) => {
                issues.push(ConfigIssue::invalid_value(
                    "memory.default_ttl_secs",
                    "must be at least 1",
                ));
                None
            }
            secs => secs.map(Duration::from_secs),
        };
        let backend = MemoryBackend::Redis {
            url: url.to_string(),
            key_prefix: self.key_prefix.clone(),
            default_ttl,
        };
        (backend, issues)
    }

    fn file_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(path),
            None => Self::default_path(),
        }
    }

    /// `$XDG_DATA_HOME/agentloop/memory.json`, or `./.agentloop/memory.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("agentloop"))
            .unwrap_or_else(|| PathBuf::from(".agentloop"))
            .join("memory.json")
    }
}
