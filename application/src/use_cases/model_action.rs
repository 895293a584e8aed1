//! Model-backed action runner.
//!
//! Asks the model to carry out (or reason through) a step and report a
//! structured outcome. Used when no concrete runner handles an action.

use crate::ports::action_runner::{ActionContext, ActionError, ActionOutput, ActionRunner};
use crate::ports::model_gateway::{ModelGateway, PromptContext};
use agentloop_domain::{ExecutionPromptTemplate, PlanStep, StepOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct ModelActionRunner {
    gateway: Arc<dyn ModelGateway>,
}

impl ModelActionRunner {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ActionRunner for ModelActionRunner {
    async fn run(&self, step: &PlanStep, ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
        let prompt = PromptContext::step_outcome(
            ExecutionPromptTemplate::system(),
            ExecutionPromptTemplate::user(ctx.goal, step, ctx.observations),
        );
        let response = self.gateway.generate_step_outcome(&prompt).await?;
        debug!("Model outcome for step {}: {} bytes", step.id, response.len());

        let outcome = StepOutcome::parse(&response).ok_or_else(|| {
            ActionError::Failed(format!("unparseable step outcome for {}", step.id))
        })?;

        if !outcome.success {
            return Err(ActionError::Failed(
                outcome
                    .error
                    .or(outcome.observation)
                    .unwrap_or_else(|| "step reported failure".to_string()),
            ));
        }

        Ok(ActionOutput {
            output: outcome.output,
            observation: outcome.observation,
        })
    }

    /// A step with an expected outcome must report something to check it against.
    async fn verify(&self, step: &PlanStep, output: &ActionOutput) -> Result<(), String> {
        if !step.expected_outcome.is_empty()
            && output.output.is_null()
            && output.observation.is_none()
        {
            return Err(format!(
                "no output to compare with expected outcome \"{}\"",
                step.expected_outcome
            ));
        }
        Ok(())
    }
}
