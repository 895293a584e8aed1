//! Executor configuration from TOML (`[executor]` section)

use agentloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// ```toml
/// [executor]
/// max_concurrency = 4          # steps per batch wave running at once
/// planning_attempts = 2        # model calls per planning phase
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutorConfig {
    pub max_concurrency: usize,
    pub planning_attempts: usize,
}

impl Default for FileExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            planning_attempts: 2,
        }
    }
}

impl FileExecutorConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_concurrency == 0 {
            issues.push(ConfigIssue::invalid_value(
                "executor.max_concurrency",
                "must be at least 1",
            ));
        }
        if self.planning_attempts == 0 {
            issues.push(ConfigIssue::invalid_value(
                "executor.planning_attempts",
                "must be at least 1",
            ));
        }
        issues
    }
}
