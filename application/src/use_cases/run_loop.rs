//! Run Loop use case
//!
//! Drives a [`Planner`] and an [`Executor`] across iterations:
//!
//! ```text
//! Running -> (Planning -> Executing -> Observing)* -> Completed
//! ```
//!
//! | Style     | Executing phase                         |
//! |-----------|-----------------------------------------|
//! | Iterative | next eligible step only                 |
//! | Batch     | whole plan, wave by wave                |
//!
//! Adaptive strategies resolve to one of the two once per run.
//!
//! The loop stops when the stop predicate (default: the plan declares the
//! goal complete) holds, or when the iteration budget is spent. Step-level
//! failures never escape; only invalid input and a fatal planning error on
//! the very first iteration are returned as `Err`.

use crate::ports::action_runner::ActionContext;
use crate::ports::loop_progress::{LoopProgressNotifier, NoLoopProgress};
use crate::ports::memory_store::MemoryStore;
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use crate::use_cases::executor::Executor;
use crate::use_cases::planner::{Planner, PlanningError};
use crate::use_cases::shared::is_cancelled;
use agentloop_domain::{
    DomainError, ExecutionStyle, LoopPhase, LoopState, NextStep, ReasoningStrategy, SetOptions,
    StrategyOverride,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a run before it produces a state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunLoopError {
    #[error("Invalid run: {0}")]
    Validation(#[from] DomainError),

    #[error("Planning failed: {0}")]
    Planning(#[from] PlanningError),
}

impl RunLoopError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunLoopError::Planning(e) if e.is_cancelled())
    }
}

pub type StopPredicate = Box<dyn Fn(&LoopState) -> bool + Send + Sync>;
pub type IterationCallback = Box<dyn Fn(&LoopState) + Send + Sync>;

/// Input for one run
pub struct RunLoopInput {
    pub goal: String,
    pub strategy: ReasoningStrategy,
    /// Overrides `strategy.max_iterations` when set
    pub max_iterations: Option<usize>,
    pub stop: Option<StopPredicate>,
    /// Observation hook; has no effect on control flow
    pub on_iteration: Option<IterationCallback>,
    pub context: serde_json::Value,
}

impl RunLoopInput {
    pub fn new(goal: impl Into<String>, strategy: ReasoningStrategy) -> Self {
        Self {
            goal: goal.into(),
            strategy,
            max_iterations: None,
            stop: None,
            on_iteration: None,
            context: serde_json::Value::Null,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_overrides(mut self, overrides: &StrategyOverride) -> Self {
        self.strategy = self.strategy.merge(overrides);
        self
    }

    pub fn with_stop(mut self, stop: impl Fn(&LoopState) -> bool + Send + Sync + 'static) -> Self {
        self.stop = Some(Box::new(stop));
        self
    }

    pub fn with_on_iteration(mut self, callback: impl Fn(&LoopState) + Send + Sync + 'static) -> Self {
        self.on_iteration = Some(Box::new(callback));
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// Use case for running the plan / execute / observe loop
pub struct RunLoopUseCase {
    planner: Arc<dyn Planner>,
    executor: Arc<dyn Executor>,
    memory: Option<Arc<dyn MemoryStore>>,
    record_observations: bool,
    progress: Arc<dyn LoopProgressNotifier>,
    logger: Arc<dyn RunLogger>,
    cancellation: Option<CancellationToken>,
}

impl RunLoopUseCase {
    pub fn new(planner: Arc<dyn Planner>, executor: Arc<dyn Executor>) -> Self {
        Self {
            planner,
            executor,
            memory: None,
            record_observations: true,
            progress: Arc::new(NoLoopProgress),
            logger: Arc::new(NoRunLogger),
            cancellation: None,
        }
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_record_observations(mut self, record: bool) -> Self {
        self.record_observations = record;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn LoopProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn enter(&self, state: &mut LoopState, phase: LoopPhase) {
        debug!("Iteration {}: {}", state.iteration + 1, phase);
        state.set_phase(phase);
        self.progress.on_phase_change(phase, state.iteration + 1);
    }

    pub async fn execute(&self, mut input: RunLoopInput) -> Result<LoopState, RunLoopError> {
        let goal = input.goal.trim().to_string();
        if goal.is_empty() {
            return Err(DomainError::EmptyGoal.into());
        }
        let max_iterations = input.max_iterations.unwrap_or(input.strategy.max_iterations);
        if max_iterations == 0 {
            return Err(DomainError::InvalidIterationBudget.into());
        }
        let strategy = input.strategy.clone().with_max_iterations(max_iterations);
        strategy.validate()?;

        let mut state = LoopState::new(goal.clone(), std::mem::take(&mut input.context));
        let style = strategy.resolve_style(&goal);
        state.style = Some(style);
        info!(
            "Run {} started: mode {}, style {}, budget {}",
            state.run_id, strategy.mode, style, max_iterations
        );
        self.progress.on_style_resolved(style);

        while state.iteration < max_iterations {
            if is_cancelled(&self.cancellation) {
                break;
            }
            let observations_before = state.observations.len();

            // ==================== Planning ====================
            self.enter(&mut state, LoopPhase::Planning);
            let previous_steps = state.completed_steps.clone();
            match self
                .planner
                .plan(&goal, &state.observations, &previous_steps, &strategy)
                .await
            {
                Ok(plan) => {
                    self.progress.on_plan_created(&plan);
                    self.logger.log(RunEvent::new(
                        "plan_created",
                        serde_json::json!({
                            "run_id": state.run_id,
                            "iteration": state.iteration + 1,
                            "plan": plan,
                        }),
                    ));
                    state.plan = Some(plan);
                }
                Err(e) if e.is_cancelled() => {
                    state.fail(e.to_string());
                    break;
                }
                Err(e) if e.is_fatal() => {
                    if state.iteration == 0 {
                        warn!("Fatal planning error on first iteration: {}", e);
                        return Err(e.into());
                    }
                    warn!("Fatal planning error, halting run: {}", e);
                    state.fail(e.to_string());
                    break;
                }
                Err(e) => {
                    warn!("Planning failed, continuing: {}", e);
                    self.progress.on_planning_error(&e.to_string());
                    state.observe(format!("Planning failed: {}", e));
                    self.finish_iteration(&mut state, &input, observations_before)
                        .await;
                    if state.is_complete {
                        break;
                    }
                    continue;
                }
            }

            // ==================== Executing ====================
            let plan = match state.plan.clone() {
                Some(plan) if !plan.is_complete => plan,
                _ => {
                    self.finish_iteration(&mut state, &input, observations_before)
                        .await;
                    if state.is_complete {
                        break;
                    }
                    continue;
                }
            };

            self.enter(&mut state, LoopPhase::Executing);
            let results = {
                let ctx = ActionContext {
                    goal: &goal,
                    observations: &state.observations,
                };
                match style {
                    ExecutionStyle::Batch => self.executor.execute_batch(&plan, ctx).await,
                    ExecutionStyle::Iterative => match self.executor.execute_next(&plan, ctx).await {
                        NextStep::Executed(result) => vec![result],
                        NextStep::NoExecutableStep => Vec::new(),
                    },
                }
            };

            // ==================== Observing ====================
            self.enter(&mut state, LoopPhase::Observing);
            if results.is_empty() && !plan.is_empty() {
                state.observe("No executable step: every pending step waits on an incomplete dependency");
            }
            for result in results {
                state.apply_result(result);
            }
            if let Some(plan) = state.plan.as_mut() {
                plan.refresh_completion();
            }

            self.finish_iteration(&mut state, &input, observations_before)
                .await;
            if state.is_complete {
                break;
            }
        }

        if is_cancelled(&self.cancellation) && !state.is_complete && state.error.is_none() {
            info!("Run {} cancelled", state.run_id);
            state.fail(DomainError::Cancelled.to_string());
        }

        state.set_phase(LoopPhase::Completed);
        self.progress.on_phase_change(LoopPhase::Completed, state.iteration);
        info!(
            "Run {} finished after {} iteration(s): complete={}",
            state.run_id, state.iteration, state.is_complete
        );
        self.logger.log(RunEvent::new(
            "run_finished",
            serde_json::json!({
                "run_id": state.run_id,
                "iterations": state.iteration,
                "is_complete": state.is_complete,
                "error": state.error,
                "observations": state.observations.len(),
            }),
        ));
        Ok(state)
    }

    /// Close an iteration: persist observations, bump the counter, evaluate
    /// the stop predicate, then run the callbacks.
    async fn finish_iteration(
        &self,
        state: &mut LoopState,
        input: &RunLoopInput,
        observations_before: usize,
    ) {
        self.record_observations(state, observations_before).await;

        state.iteration += 1;
        state.is_complete = match &input.stop {
            Some(stop) => stop(state),
            None => state.plan_is_complete(),
        };

        self.logger.log(RunEvent::new(
            "iteration_complete",
            serde_json::json!({
                "run_id": state.run_id,
                "iteration": state.iteration,
                "is_complete": state.is_complete,
                "new_observations": &state.observations[observations_before..],
            }),
        ));
        self.progress.on_iteration_complete(state);
        if let Some(callback) = &input.on_iteration {
            callback(state);
        }
    }

    async fn record_observations(&self, state: &mut LoopState, observations_before: usize) {
        let Some(memory) = &self.memory else { return };
        if !self.record_observations || state.observations.len() == observations_before {
            return;
        }

        let iteration = state.iteration + 1;
        let key = format!("run/{}/iteration/{}", state.run_id, iteration);
        let value = serde_json::json!({
            "goal": state.goal,
            "iteration": iteration,
            "observations": &state.observations[observations_before..],
        });
        let options = SetOptions::default()
            .with_tag("observation")
            .with_tag(format!("run:{}", state.run_id));

        if let Err(e) = memory.set(&key, value, options).await {
            warn!("Failed to record observations for iteration {}: {}", iteration, e);
            state.observe(format!("Memory write failed: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::ApprovalGate;
    use crate::config::LoopParams;
    use crate::ports::action_runner::{ActionError, ActionOutput, ActionRunner};
    use crate::ports::approval_notifier::NoApprovalNotifier;
    use crate::ports::memory_store::MemoryError;
    use crate::ports::model_gateway::GatewayError;
    use crate::use_cases::executor::PlanExecutor;
    use agentloop_domain::{
        HilMode, Memory, MemoryQuery, Plan, PlanStep, StepAction, StepDisposition,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays queued planner results; after the queue runs out, emits a
    /// fresh single-step plan per call.
    struct ScriptedPlanner {
        queue: Mutex<Vec<Result<Plan, PlanningError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedPlanner {
        fn new(queue: Vec<Result<Plan, PlanningError>>) -> Self {
            Self {
                queue: Mutex::new(queue),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Planner for ScriptedPlanner {
        async fn plan(
            &self,
            _goal: &str,
            _observations: &[String],
            _previous_steps: &[PlanStep],
            strategy: &ReasoningStrategy,
        ) -> Result<Plan, PlanningError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let mut queue = self.queue.lock().unwrap();
            if !queue.is_empty() {
                return queue.remove(0);
            }
            Ok(Plan::new(strategy.clone()).with_step(step(&format!("s{}", n), "noop")))
        }
    }

    struct OkRunner;

    #[async_trait]
    impl ActionRunner for OkRunner {
        async fn run(&self, step: &PlanStep, _ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
            if step.action.name == "fail" {
                return Err(ActionError::Failed("boom".to_string()));
            }
            Ok(ActionOutput::new(serde_json::json!("ok")))
        }

        fn requires_approval(&self, action: &agentloop_domain::StepAction) -> bool {
            action.name == "deploy"
        }
    }

    #[derive(Default)]
    struct RecordingMemory {
        keys: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl MemoryStore for RecordingMemory {
        async fn set(
            &self,
            key: &str,
            value: serde_json::Value,
            options: SetOptions,
        ) -> Result<Memory, MemoryError> {
            if self.fail {
                return Err(MemoryError::Storage("backend unavailable".to_string()));
            }
            let memory = Memory::create(key, value, options, chrono::Utc::now())?;
            self.keys
                .lock()
                .unwrap()
                .push((key.to_string(), memory.metadata.tags.clone()));
            Ok(memory)
        }

        async fn get(&self, _key: &str) -> Result<Option<Memory>, MemoryError> {
            Ok(None)
        }

        async fn search(&self, _query: &MemoryQuery) -> Result<Vec<Memory>, MemoryError> {
            Ok(Vec::new())
        }

        async fn delete(&self, _key: &str) -> Result<bool, MemoryError> {
            Ok(false)
        }

        async fn clear(&self, _tags: Option<&[String]>) -> Result<usize, MemoryError> {
            Ok(0)
        }

        async fn purge_expired(&self) -> Result<usize, MemoryError> {
            Ok(0)
        }
    }

    fn step(id: &str, action: &str) -> PlanStep {
        PlanStep::new(id, id, StepAction::new(action))
    }

    fn use_case(planner: Arc<ScriptedPlanner>, params: LoopParams) -> RunLoopUseCase {
        let gate = Arc::new(ApprovalGate::new(Arc::new(NoApprovalNotifier), CancellationToken::new()));
        let executor = Arc::new(PlanExecutor::new(Arc::new(OkRunner), gate, params));
        RunLoopUseCase::new(planner, executor)
    }

    #[tokio::test]
    async fn test_budget_exhaustion_with_never_true_predicate() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();

        let input = RunLoopInput::new("Explore the repo", ReasoningStrategy::iterative())
            .with_max_iterations(3)
            .with_stop(|_| false)
            .with_on_iteration(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let state = use_case(planner.clone(), LoopParams::default())
            .execute(input)
            .await
            .unwrap();

        assert_eq!(state.iteration, 3);
        assert!(!state.is_complete);
        assert_eq!(planner.calls(), 3);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(state.completed_steps.len(), 3);
        assert_eq!(state.phase, LoopPhase::Completed);
    }

    #[tokio::test]
    async fn test_batch_plan_completes_goal_in_one_iteration() {
        let strategy = ReasoningStrategy::batch();
        let plan = Plan::new(strategy.clone())
            .concluding()
            .with_step(step("a", "noop"))
            .with_step(step("b", "noop").with_dependency("a"));
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(plan)]));

        let state = use_case(planner.clone(), LoopParams::default())
            .execute(RunLoopInput::new("Build then ship", strategy))
            .await
            .unwrap();

        assert!(state.is_complete);
        assert_eq!(state.iteration, 1);
        assert_eq!(state.step_results.len(), 2);
        assert_eq!(state.observations.len(), 2);
        assert_eq!(state.style, Some(ExecutionStyle::Batch));
        assert_eq!(planner.calls(), 1);
    }

    #[tokio::test]
    async fn test_iterative_runs_one_step_per_iteration() {
        let strategy = ReasoningStrategy::iterative();
        let plan = Plan::new(strategy.clone())
            .with_step(step("1", "noop"))
            .with_step(step("2", "noop"));
        let done = Plan::completed(strategy.clone());
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(plan), Ok(done)]));

        let state = use_case(planner, LoopParams::default())
            .execute(RunLoopInput::new("Investigate", strategy))
            .await
            .unwrap();

        assert!(state.is_complete);
        assert_eq!(state.iteration, 2);
        assert_eq!(state.step_results.len(), 1, "only the first step ran");
    }

    #[tokio::test]
    async fn test_non_fatal_planning_error_becomes_observation() {
        let strategy = ReasoningStrategy::iterative();
        let planner = Arc::new(ScriptedPlanner::new(vec![
            Err(PlanningError::Unparseable("gibberish".to_string())),
            Ok(Plan::completed(strategy.clone())),
        ]));

        let state = use_case(planner, LoopParams::default())
            .execute(RunLoopInput::new("Investigate", strategy))
            .await
            .unwrap();

        assert!(state.is_complete);
        assert_eq!(state.iteration, 2);
        assert!(state.observations[0].starts_with("Planning failed:"));
    }

    #[tokio::test]
    async fn test_fatal_error_on_first_iteration_is_returned() {
        let planner = Arc::new(ScriptedPlanner::new(vec![Err(PlanningError::Gateway(
            GatewayError::Unauthorized("bad key".to_string()),
        ))]));

        let err = use_case(planner, LoopParams::default())
            .execute(RunLoopInput::new("Anything", ReasoningStrategy::iterative()))
            .await
            .unwrap_err();
        assert!(matches!(err, RunLoopError::Planning(PlanningError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_fatal_error_later_halts_with_error_attached() {
        let planner = Arc::new(ScriptedPlanner::new(vec![
            Ok(Plan::new(ReasoningStrategy::iterative()).with_step(step("1", "noop"))),
            Err(PlanningError::Gateway(GatewayError::ModelNotAvailable("m".to_string()))),
        ]));

        let state = use_case(planner.clone(), LoopParams::default())
            .execute(RunLoopInput::new("Anything", ReasoningStrategy::iterative()))
            .await
            .unwrap();

        assert!(!state.is_complete);
        assert_eq!(state.iteration, 1);
        assert!(state.error.as_deref().unwrap().contains("Model not available"));
        assert_eq!(planner.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_running() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let use_case = use_case(planner.clone(), LoopParams::default());

        let err = use_case
            .execute(RunLoopInput::new("  ", ReasoningStrategy::iterative()))
            .await
            .unwrap_err();
        assert_eq!(err, RunLoopError::Validation(DomainError::EmptyGoal));

        let err = use_case
            .execute(RunLoopInput::new("goal", ReasoningStrategy::iterative()).with_max_iterations(0))
            .await
            .unwrap_err();
        assert_eq!(err, RunLoopError::Validation(DomainError::InvalidIterationBudget));
        assert_eq!(planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_step_failures_stay_inside_state() {
        let strategy = ReasoningStrategy::batch();
        let plan = Plan::new(strategy.clone())
            .concluding()
            .with_step(step("a", "fail"))
            .with_step(step("b", "noop").with_dependency("a"));
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(plan)]));

        let state = use_case(planner, LoopParams::default())
            .execute(RunLoopInput::new("Do it", strategy).with_max_iterations(1))
            .await
            .unwrap();

        assert!(!state.is_complete);
        assert!(state.error.is_none());
        let dispositions: Vec<StepDisposition> =
            state.step_results.iter().map(|r| r.disposition).collect();
        assert_eq!(dispositions, vec![StepDisposition::Failed, StepDisposition::Skipped]);
        assert_eq!(state.observations[0], "[a] failed: Action failed: boom");
    }

    #[tokio::test]
    async fn test_denied_approval_is_recorded() {
        let strategy = ReasoningStrategy::batch();
        let plan = Plan::new(strategy.clone())
            .concluding()
            .with_step(step("A", "deploy"))
            .with_step(step("B", "noop").with_dependency("A"));
        let planner = Arc::new(ScriptedPlanner::new(vec![Ok(plan)]));

        let state = use_case(planner, LoopParams::default().with_hil_mode(HilMode::AutoDeny))
            .execute(RunLoopInput::new("Ship it", strategy).with_max_iterations(1))
            .await
            .unwrap();

        assert_eq!(state.step_results[0].disposition, StepDisposition::Denied);
        assert_eq!(state.step_results[1].disposition, StepDisposition::Skipped);
        assert!(state.completed_steps.is_empty());
    }

    #[tokio::test]
    async fn test_observations_recorded_to_memory() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let memory = Arc::new(RecordingMemory::default());

        let state = use_case(planner, LoopParams::default())
            .with_memory(memory.clone())
            .execute(RunLoopInput::new("Explore", ReasoningStrategy::iterative()).with_max_iterations(2))
            .await
            .unwrap();

        let keys = memory.keys.lock().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].0, format!("run/{}/iteration/1", state.run_id));
        assert_eq!(keys[1].0, format!("run/{}/iteration/2", state.run_id));
        assert!(keys[0].1.contains(&"observation".to_string()));
        assert!(keys[0].1.contains(&format!("run:{}", state.run_id)));
    }

    #[tokio::test]
    async fn test_storage_error_is_non_fatal_observation() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let memory = Arc::new(RecordingMemory {
            fail: true,
            ..Default::default()
        });

        let state = use_case(planner, LoopParams::default())
            .with_memory(memory)
            .execute(RunLoopInput::new("Explore", ReasoningStrategy::iterative()).with_max_iterations(2))
            .await
            .unwrap();

        assert_eq!(state.iteration, 2);
        assert!(state.error.is_none());
        assert!(state
            .observations
            .iter()
            .any(|o| o.starts_with("Memory write failed: Storage error")));
    }

    #[tokio::test]
    async fn test_cancelled_run_reports_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let planner = Arc::new(ScriptedPlanner::new(vec![]));

        let state = use_case(planner.clone(), LoopParams::default())
            .with_cancellation(token)
            .execute(RunLoopInput::new("Explore", ReasoningStrategy::iterative()))
            .await
            .unwrap();

        assert_eq!(state.error.as_deref(), Some("Operation cancelled"));
        assert!(!state.is_complete);
        assert_eq!(planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_overrides_apply_to_input_strategy() {
        let input = RunLoopInput::new("goal", ReasoningStrategy::iterative())
            .with_overrides(&StrategyOverride::default().max_iterations(7));
        assert_eq!(input.strategy.max_iterations, 7);
        assert!(input.strategy.is_iterative());
    }

    #[tokio::test]
    async fn test_context_reaches_state_and_predicate() {
        let planner = Arc::new(ScriptedPlanner::new(vec![]));
        let input = RunLoopInput::new("Explore the repo", ReasoningStrategy::iterative())
            .with_context(serde_json::json!({"stop_after": 2}))
            .with_stop(|state| state.context["stop_after"] == serde_json::json!(state.iteration));

        let state = use_case(planner.clone(), LoopParams::default())
            .execute(input)
            .await
            .unwrap();

        assert_eq!(state.context, serde_json::json!({"stop_after": 2}));
        assert!(state.is_complete);
        assert_eq!(state.iteration, 2);
        assert_eq!(planner.calls(), 2);
    }
}
