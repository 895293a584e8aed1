//! Orchestration progress port.
//!
//! [`LoopProgressNotifier`] is an output port the presentation layer
//! implements to display a run as it happens. All methods default to
//! no-ops, so implementers only override what they display.

use agentloop_domain::{ExecutionStyle, LoopPhase, LoopState, Plan, PlanStep, StepResult, ToolApproval};

pub trait LoopProgressNotifier: Send + Sync {
    /// Called when the loop enters a new phase
    fn on_phase_change(&self, _phase: LoopPhase, _iteration: usize) {}

    /// Called once per run after the execution style is chosen
    fn on_style_resolved(&self, _style: ExecutionStyle) {}

    fn on_plan_created(&self, _plan: &Plan) {}

    /// Called when planning failed but the run continues
    fn on_planning_error(&self, _error: &str) {}

    fn on_step_start(&self, _step: &PlanStep) {}

    fn on_step_complete(&self, _result: &StepResult) {}

    /// Called before the executor blocks on an approval decision
    fn on_approval_required(&self, _approval: &ToolApproval) {}

    fn on_iteration_complete(&self, _state: &LoopState) {}
}

/// No-op implementation
pub struct NoLoopProgress;

impl LoopProgressNotifier for NoLoopProgress {}
