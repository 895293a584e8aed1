//! Orchestration loop state

use crate::execution::StepResult;
use crate::plan::{Plan, PlanStep, StepId};
use crate::reasoning::ExecutionStyle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Phase of an orchestration run.
///
/// `Running -> (Planning -> Executing -> Observing)* -> Completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    #[default]
    Running,
    Planning,
    Executing,
    Observing,
    Completed,
}

impl LoopPhase {
    pub fn as_str(&self) -> &str {
        match self {
            LoopPhase::Running => "running",
            LoopPhase::Planning => "planning",
            LoopPhase::Executing => "executing",
            LoopPhase::Observing => "observing",
            LoopPhase::Completed => "completed",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            LoopPhase::Running => "Running",
            LoopPhase::Planning => "Planning",
            LoopPhase::Executing => "Executing",
            LoopPhase::Observing => "Observing",
            LoopPhase::Completed => "Completed",
        }
    }
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of one orchestration run. Owned by the loop; never shared across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopState {
    pub run_id: String,
    pub goal: String,
    pub iteration: usize,
    pub is_complete: bool,
    pub plan: Option<Plan>,
    /// Ordered outcome records fed back into planning
    pub observations: Vec<String>,
    /// Opaque caller-supplied context
    pub context: serde_json::Value,
    pub phase: LoopPhase,
    /// Execution style chosen for this run (adaptive resolves once per run)
    pub style: Option<ExecutionStyle>,
    pub completed_steps: Vec<PlanStep>,
    pub step_results: Vec<StepResult>,
    /// Why the run stopped short, if it did
    pub error: Option<String>,
}

impl LoopState {
    pub fn new(goal: impl Into<String>, context: serde_json::Value) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            goal: goal.into(),
            iteration: 0,
            is_complete: false,
            plan: None,
            observations: Vec::new(),
            context,
            phase: LoopPhase::Running,
            style: None,
            completed_steps: Vec::new(),
            step_results: Vec::new(),
            error: None,
        }
    }

    pub fn set_phase(&mut self, phase: LoopPhase) {
        self.phase = phase;
    }

    pub fn observe(&mut self, observation: impl Into<String>) {
        self.observations.push(observation.into());
    }

    pub fn completed_step_ids(&self) -> HashSet<StepId> {
        self.completed_steps.iter().map(|s| s.id.clone()).collect()
    }

    /// Record a step result, moving the step into `completed_steps` on success.
    pub fn apply_result(&mut self, result: StepResult) {
        self.observe(result.to_observation());
        if result.success
            && let Some(plan) = self.plan.as_mut()
            && plan.mark_step_complete(&result.step_id)
            && let Some(step) = plan.step(&result.step_id)
        {
            self.completed_steps.push(step.clone());
        }
        self.step_results.push(result);
    }

    /// Whether the current plan declares the goal done.
    pub fn plan_is_complete(&self) -> bool {
        self.plan.as_ref().is_some_and(|p| p.is_complete)
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.is_complete = false;
        self.error = Some(error.into());
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &StepResult> {
        self.step_results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::StepAction;
    use crate::reasoning::ReasoningStrategy;
    use chrono::Utc;

    #[test]
    fn test_apply_result_marks_step_complete() {
        let mut state = LoopState::new("goal", serde_json::Value::Null);
        state.plan = Some(
            Plan::new(ReasoningStrategy::iterative())
                .with_step(PlanStep::new("1", "first", StepAction::new("noop"))),
        );

        state.apply_result(StepResult::success(
            StepId::new("1"),
            serde_json::json!("done"),
            None,
            Utc::now(),
        ));

        assert_eq!(state.observations, vec!["[1] succeeded: done"]);
        assert_eq!(state.completed_steps.len(), 1);
        assert!(state.completed_step_ids().contains(&StepId::new("1")));
        assert!(state.plan.as_ref().unwrap().all_steps_complete());
    }

    #[test]
    fn test_failed_result_does_not_complete_step() {
        let mut state = LoopState::new("goal", serde_json::Value::Null);
        state.plan = Some(
            Plan::new(ReasoningStrategy::iterative())
                .with_step(PlanStep::new("1", "first", StepAction::new("noop"))),
        );

        state.apply_result(StepResult::failure(StepId::new("1"), "boom", Utc::now()));

        assert!(state.completed_steps.is_empty());
        assert_eq!(state.failed_results().count(), 1);
        assert_eq!(state.observations, vec!["[1] failed: boom"]);
    }

    #[test]
    fn test_new_state_defaults() {
        let state = LoopState::new("goal", serde_json::json!({"k": 1}));
        assert_eq!(state.iteration, 0);
        assert_eq!(state.phase, LoopPhase::Running);
        assert!(!state.plan_is_complete());
        assert!(!state.run_id.is_empty());
    }
}
