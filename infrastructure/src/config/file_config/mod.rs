//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. Enum-like fields stay strings
//! here and are parsed with a `parse_*` method that reports problems as
//! [`ConfigIssue`]s instead of failing the load.

mod actions;
mod approval;
mod executor;
mod logging;
mod memory;
mod model;
mod strategy;

pub use actions::FileActionsConfig;
pub use approval::FileApprovalConfig;
pub use executor::FileExecutorConfig;
pub use logging::FileLoggingConfig;
pub use memory::{FileMemoryConfig, MemoryBackend};
pub use model::FileModelConfig;
pub use strategy::FileStrategyConfig;

use agentloop_application::LoopParams;
use agentloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub strategy: FileStrategyConfig,
    pub approval: FileApprovalConfig,
    pub memory: FileMemoryConfig,
    pub model: FileModelConfig,
    pub actions: FileActionsConfig,
    pub executor: FileExecutorConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.strategy.to_strategy().1);
        issues.extend(self.approval.parse_hil_mode().1);
        issues.extend(self.memory.parse_backend().1);
        issues.extend(self.model.validate());
        issues.extend(self.actions.validate());
        issues.extend(self.executor.validate());
        issues
    }

    /// Loop parameters derived from `[approval]`, `[executor]` and `[memory]`.
    pub fn to_loop_params(&self) -> (LoopParams, Vec<ConfigIssue>) {
        let (hil_mode, issues) = self.approval.parse_hil_mode();
        let params = LoopParams::default()
            .with_hil_mode(hil_mode)
            .with_approval_timeout(self.approval.timeout())
            .with_max_concurrency(self.executor.max_concurrency)
            .with_planning_attempts(self.executor.planning_attempts)
            .with_record_observations(self.memory.record_observations);
        (params, issues)
    }
}
