//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// ```toml
/// [logging]
/// run_log = "runs.jsonl"       # JSONL run events; unset disables
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub run_log: Option<String>,
}
