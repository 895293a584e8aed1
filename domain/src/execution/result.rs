//! Step execution results

use crate::plan::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a step left the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDisposition {
    Completed,
    Failed,
    /// Approval was denied (explicitly, by timeout, or by cancellation)
    Denied,
    /// Not attempted because a dependency did not succeed
    Skipped,
}

impl StepDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepDisposition::Completed => "succeeded",
            StepDisposition::Failed => "failed",
            StepDisposition::Denied => "denied",
            StepDisposition::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of executing (or declining to execute) one plan step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: StepId,
    pub success: bool,
    pub output: serde_json::Value,
    pub observation: Option<String>,
    pub error: Option<String>,
    pub disposition: StepDisposition,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepResult {
    pub fn success(
        step_id: StepId,
        output: serde_json::Value,
        observation: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            step_id,
            success: true,
            output,
            observation,
            error: None,
            disposition: StepDisposition::Completed,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failure(step_id: StepId, error: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self::unsuccessful(step_id, StepDisposition::Failed, error, started_at)
    }

    pub fn denied(step_id: StepId, reason: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self::unsuccessful(step_id, StepDisposition::Denied, reason, started_at)
    }

    pub fn skipped(step_id: StepId, reason: impl Into<String>) -> Self {
        Self::unsuccessful(step_id, StepDisposition::Skipped, reason, Utc::now())
    }

    fn unsuccessful(
        step_id: StepId,
        disposition: StepDisposition,
        error: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            step_id,
            success: false,
            output: serde_json::Value::Null,
            observation: None,
            error: Some(error.into()),
            disposition,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }

    /// One-line observation fed back into planning.
    ///
    /// Format: `[<step id>] <disposition>: <detail>`.
    pub fn to_observation(&self) -> String {
        let detail = if self.success {
            self.observation
                .clone()
                .unwrap_or_else(|| render_output(&self.output))
        } else {
            let error = self.error.as_deref().unwrap_or("unknown error");
            match &self.observation {
                Some(obs) => format!("{} ({})", error, obs),
                None => error.to_string(),
            }
        };
        format!("[{}] {}: {}", self.step_id, self.disposition, detail)
    }
}

fn render_output(output: &serde_json::Value) -> String {
    match output {
        serde_json::Value::Null => "no output".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Result of asking the executor for the next eligible step.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Executed(StepResult),
    /// Every incomplete step is waiting on an incomplete dependency
    NoExecutableStep,
}

/// Step outcome as reported by a model or action.
///
/// Wire shape: `{ "success", "output", "observation", "error" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub success: bool,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StepOutcome {
    /// Extract an outcome from model text (fenced ```json block or raw JSON).
    pub fn parse(response: &str) -> Option<Self> {
        let mut in_block = false;
        let mut current_block = String::new();

        for line in response.lines() {
            let trimmed = line.trim();
            if !in_block && (trimmed == "```json" || trimmed == "```") {
                in_block = true;
                current_block.clear();
            } else if in_block && trimmed == "```" {
                in_block = false;
                if let Ok(outcome) = serde_json::from_str::<StepOutcome>(&current_block) {
                    return Some(outcome);
                }
            } else if in_block {
                current_block.push_str(line);
                current_block.push('\n');
            }
        }

        serde_json::from_str(response.trim()).ok()
    }
}
