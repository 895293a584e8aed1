//! Model gateway port
//!
//! The language model is an opaque collaborator: the core hands it a prompt
//! and receives text that should contain plan-shaped or outcome-shaped JSON.
//! Parsing stays in the planner and the model-backed action runner.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during model calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Gateway misconfigured: {0}")]
    Misconfigured(String),

    #[error("No more scripted responses for {0}")]
    Exhausted(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    /// Errors that retrying (or re-planning) cannot fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::Unauthorized(_)
                | GatewayError::ModelNotAvailable(_)
                | GatewayError::Misconfigured(_)
                | GatewayError::Exhausted(_)
        )
    }
}

/// What a prompt is for. Gateways may route or log on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptPurpose {
    Plan,
    StepOutcome,
}

impl PromptPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptPurpose::Plan => "plan",
            PromptPurpose::StepOutcome => "step_outcome",
        }
    }
}

/// A fully built prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub purpose: PromptPurpose,
    pub system: String,
    pub user: String,
}

impl PromptContext {
    pub fn plan(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            purpose: PromptPurpose::Plan,
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn step_outcome(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            purpose: PromptPurpose::StepOutcome,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Gateway to a text generation backend.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send a prompt and return the model's raw text answer
    async fn complete(&self, prompt: &PromptContext) -> Result<String, GatewayError>;

    /// Ask for a plan. Defaults to [`complete`](Self::complete).
    async fn generate_plan(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        self.complete(prompt).await
    }

    /// Ask for a step outcome. Defaults to [`complete`](Self::complete).
    async fn generate_step_outcome(&self, prompt: &PromptContext) -> Result<String, GatewayError> {
        self.complete(prompt).await
    }
}
