//! Planner use case
//!
//! Turns a goal plus what has been observed so far into a [`Plan`]. The
//! [`Planner`] trait is the seam the orchestration loop depends on;
//! [`ModelPlanner`] is the model-backed implementation.

use crate::ports::model_gateway::{GatewayError, ModelGateway, PromptContext};
use crate::use_cases::shared::{cancellable, is_cancelled};
use agentloop_domain::{
    DomainError, ExecutionStyle, Plan, PlanStep, PlanningPromptTemplate, ReasoningStrategy,
    StepId, parse_plan,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error("Invalid planning request: {0}")]
    Validation(#[from] DomainError),

    #[error("Model call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Could not parse a plan from the model response: {0}")]
    Unparseable(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(DomainError),

    #[error("Planner returned no new steps for an unfinished goal")]
    EmptyPlan,

    #[error("Operation cancelled")]
    Cancelled,
}

impl PlanningError {
    /// Fatal errors halt the loop; the rest abort only the current iteration.
    pub fn is_fatal(&self) -> bool {
        match self {
            PlanningError::Validation(_) | PlanningError::Cancelled => true,
            PlanningError::Gateway(e) => e.is_fatal(),
            PlanningError::Unparseable(_)
            | PlanningError::InvalidPlan(_)
            | PlanningError::EmptyPlan => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlanningError::Cancelled)
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlanningError::Unparseable(_) | PlanningError::InvalidPlan(_) | PlanningError::EmptyPlan
        )
    }
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce the next plan.
    ///
    /// Iterative style yields the next step(s) and never reuses an id from
    /// `previous_steps`; batch style yields a complete, self-contained plan.
    /// A zero-step plan is only returned when it declares the goal complete.
    async fn plan(
        &self,
        goal: &str,
        observations: &[String],
        previous_steps: &[PlanStep],
        strategy: &ReasoningStrategy,
    ) -> Result<Plan, PlanningError>;
}

/// Planner backed by a [`ModelGateway`].
pub struct ModelPlanner {
    gateway: Arc<dyn ModelGateway>,
    attempts: usize,
    cancellation: Option<CancellationToken>,
}

impl ModelPlanner {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            attempts: 2,
            cancellation: None,
        }
    }

    /// Model calls per planning phase (at least one)
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Turn raw model text into a valid plan for this style.
    fn interpret(
        &self,
        response: &str,
        previous_steps: &[PlanStep],
        strategy: &ReasoningStrategy,
        style: ExecutionStyle,
    ) -> Result<Plan, PlanningError> {
        let mut plan = parse_plan(response, strategy).ok_or_else(|| {
            PlanningError::Unparseable(preview(response))
        })?;
        if plan.is_complete && plan.is_empty() {
            return Ok(plan);
        }
        if style.is_batch() {
            plan.concludes_goal = true;
        }

        let previous: HashSet<StepId> = previous_steps.iter().map(|s| s.id.clone()).collect();
        plan.steps.retain(|step| {
            let repeated = previous.contains(&step.id);
            if repeated {
                warn!("Dropping re-emitted step {}", step.id);
            }
            !repeated
        });
        plan.strip_satisfied_dependencies(&previous);

        if plan.is_empty() {
            if plan.concludes_goal || plan.is_complete {
                return Ok(Plan::completed(strategy.clone()));
            }
            return Err(PlanningError::EmptyPlan);
        }

        plan.validate().map_err(PlanningError::InvalidPlan)?;
        Ok(plan)
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl Planner for ModelPlanner {
    async fn plan(
        &self,
        goal: &str,
        observations: &[String],
        previous_steps: &[PlanStep],
        strategy: &ReasoningStrategy,
    ) -> Result<Plan, PlanningError> {
        if goal.trim().is_empty() {
            return Err(DomainError::EmptyGoal.into());
        }
        strategy.validate()?;

        let style = strategy.resolve_style(goal);
        let system = PlanningPromptTemplate::system(style);
        let base_user = PlanningPromptTemplate::user(goal, observations, previous_steps, style);
        let mut user = base_user.clone();
        let mut last_error = PlanningError::EmptyPlan;

        for attempt in 1..=self.attempts {
            if is_cancelled(&self.cancellation) {
                return Err(PlanningError::Cancelled);
            }
            debug!("Planning attempt {}/{} ({})", attempt, self.attempts, style);

            let prompt = PromptContext::plan(system.clone(), user.clone());
            let response = cancellable(&self.cancellation, self.gateway.generate_plan(&prompt))
                .await
                .ok_or(PlanningError::Cancelled)??;

            match self.interpret(&response, previous_steps, strategy, style) {
                Ok(plan) => {
                    info!(
                        "Plan created with {} step(s) (complete: {}, concludes goal: {})",
                        plan.steps.len(),
                        plan.is_complete,
                        plan.concludes_goal
                    );
                    return Ok(plan);
                }
                Err(e) if e.is_retryable() => {
                    warn!("Planning attempt {} unusable: {}", attempt, e);
                    user = format!("{}\n\n{}", base_user, PlanningPromptTemplate::retry(&e.to_string()));
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}
