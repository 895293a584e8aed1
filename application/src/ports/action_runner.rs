//! Action runner port
//!
//! Carries out a step's opaque action. The executor never interprets action
//! names or inputs itself.

use async_trait::async_trait;
use agentloop_domain::{PlanStep, StepAction};
use std::time::Duration;
use thiserror::Error;

use super::model_gateway::GatewayError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid input for {action}: {reason}")]
    InvalidInput { action: String, reason: String },

    #[error("Action failed: {0}")]
    Failed(String),

    #[error("Action timed out after {0:?}")]
    Timeout(Duration),

    #[error("Action not permitted: {0}")]
    NotPermitted(String),

    #[error("Model call failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// Successful action output.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutput {
    pub output: serde_json::Value,
    pub observation: Option<String>,
}

impl ActionOutput {
    pub fn new(output: serde_json::Value) -> Self {
        Self {
            output,
            observation: None,
        }
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }
}

/// What the runner may know about the run.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub goal: &'a str,
    pub observations: &'a [String],
}

/// Port for carrying out step actions
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn run(&self, step: &PlanStep, ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError>;

    /// Whether this action is high-risk and must pass the approval gate
    fn requires_approval(&self, _action: &StepAction) -> bool {
        false
    }

    /// Post-run check used when the strategy requires verification.
    ///
    /// `Err` carries the reason the output was rejected.
    async fn verify(&self, _step: &PlanStep, _output: &ActionOutput) -> Result<(), String> {
        Ok(())
    }
}
