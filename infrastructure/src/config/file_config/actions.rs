//! Action runner configuration from TOML (`[actions]` section)

use crate::actions::CommandRunnerConfig;
use agentloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw actions configuration from TOML
///
/// # Example
///
/// ```toml
/// [actions]
/// allow_commands = true
/// working_dir = "."
/// command_timeout_secs = 60
/// trusted_commands = ["ls", "cat", "git"]   # run without approval
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileActionsConfig {
    pub allow_commands: bool,
    pub working_dir: Option<String>,
    pub command_timeout_secs: u64,
    pub trusted_commands: Vec<String>,
}

impl Default for FileActionsConfig {
    fn default() -> Self {
        Self {
            allow_commands: false,
            working_dir: None,
            command_timeout_secs: 60,
            trusted_commands: Vec::new(),
        }
    }
}

impl FileActionsConfig {
    pub fn to_command_config(&self) -> CommandRunnerConfig {
        CommandRunnerConfig {
            allow_commands: self.allow_commands,
            working_dir: self.working_dir.as_ref().map(PathBuf::from),
            timeout: Duration::from_secs(self.command_timeout_secs.max(1)),
            trusted_commands: self.trusted_commands.clone(),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        if self.command_timeout_secs == 0 {
            vec![ConfigIssue::invalid_value(
                "actions.command_timeout_secs",
                "must be at least 1",
            )]
        } else {
            vec![]
        }
    }
}
