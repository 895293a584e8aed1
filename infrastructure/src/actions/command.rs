//! Shell command action: `run_command`.
//!
//! Input: `{ "command": "...", "working_dir": "..." }`. The command runs via
//! `sh -c` (`cmd /C` on Windows) with stdout and stderr captured.

use agentloop_application::ports::action_runner::{
    ActionContext, ActionError, ActionOutput, ActionRunner,
};
use agentloop_domain::{PlanStep, StepAction};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Action name handled by [`CommandActionRunner`].
pub const RUN_COMMAND: &str = "run_command";

/// Maximum bytes kept from each output stream.
const MAX_OUTPUT_SIZE: usize = 64 * 1024;

/// Characters that let a "trusted" program chain into something else.
const SHELL_META: &[char] = &[';', '|', '&', '$', '`', '>', '<', '\n'];

#[derive(Debug, Clone)]
pub struct CommandRunnerConfig {
    /// Master switch. When off every `run_command` is refused.
    pub allow_commands: bool,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
    /// Programs that run without approval
    pub trusted_commands: Vec<String>,
}

impl Default for CommandRunnerConfig {
    fn default() -> Self {
        Self {
            allow_commands: false,
            working_dir: None,
            timeout: Duration::from_secs(60),
            trusted_commands: Vec::new(),
        }
    }
}

pub struct CommandActionRunner {
    config: CommandRunnerConfig,
}

impl CommandActionRunner {
    pub fn new(config: CommandRunnerConfig) -> Self {
        Self { config }
    }

    /// A command is trusted when its program is listed and it has no shell operators.
    pub fn is_trusted(&self, command: &str) -> bool {
        if command.contains(SHELL_META) {
            return false;
        }
        command
            .split_whitespace()
            .next()
            .is_some_and(|program| self.config.trusted_commands.iter().any(|t| t == program))
    }

    fn build(&self, command: &str, working_dir: Option<&str>) -> Result<Command, ActionError> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        let dir = working_dir
            .map(PathBuf::from)
            .or_else(|| self.config.working_dir.clone());
        if let Some(dir) = dir {
            if !dir.is_dir() {
                return Err(ActionError::InvalidInput {
                    action: RUN_COMMAND.to_string(),
                    reason: format!("working directory does not exist: {}", dir.display()),
                });
            }
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

fn truncate(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > MAX_OUTPUT_SIZE {
        let mut cut = MAX_OUTPUT_SIZE;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... (output truncated)");
    }
    text
}

#[async_trait]
impl ActionRunner for CommandActionRunner {
    async fn run(&self, step: &PlanStep, _ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        if step.action.name != RUN_COMMAND {
            return Err(ActionError::UnknownAction(step.action.name.clone()));
        }
        let command = step
            .action
            .input_str("command")
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ActionError::InvalidInput {
                action: RUN_COMMAND.to_string(),
                reason: "missing 'command'".to_string(),
            })?;
        if !self.config.allow_commands {
            return Err(ActionError::NotPermitted(
                "command execution is disabled (actions.allow_commands)".to_string(),
            ));
        }

        let mut cmd = self.build(command, step.action.input_str("working_dir"))?;
        info!(step = %step.id, command, "Running command");

        let output = match tokio::time::timeout(self.config.timeout, cmd.output()).await {
            Ok(result) => {
                result.map_err(|e| ActionError::Failed(format!("failed to spawn command: {}", e)))?
            }
            Err(_) => return Err(ActionError::Timeout(self.config.timeout)),
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = truncate(&output.stdout);
        let stderr = truncate(&output.stderr);
        debug!(step = %step.id, exit_code, stdout_bytes = stdout.len(), "Command finished");

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() { &stdout } else { &stderr };
            return Err(ActionError::Failed(format!(
                "command exited with code {}: {}",
                exit_code,
                detail.trim()
            )));
        }

        let observation = if stdout.trim().is_empty() {
            format!("`{}` succeeded with no output", command)
        } else {
            format!("`{}` printed: {}", command, stdout.trim())
        };
        Ok(ActionOutput::new(json!({
            "exit_code": exit_code,
            "stdout": stdout,
            "stderr": stderr,
        }))
        .with_observation(observation))
    }

    fn requires_approval(&self, action: &StepAction) -> bool {
        action.name == RUN_COMMAND
            && !action.input_str("command").is_some_and(|c| self.is_trusted(c))
    }
}
