//! Executor use case
//!
//! Carries out plan steps through an [`ActionRunner`], gating sensitive
//! actions on the [`ApprovalGate`]. Step-level failures never escape: every
//! attempted (or skipped) step yields a [`StepResult`].
//!
//! Batch execution starts each step as soon as all of its own dependencies
//! have results, with at most `max_concurrency` steps in flight. A step
//! parked on the approval gate holds back only its dependents. Results come
//! back in plan order.

use crate::approval::ApprovalGate;
use crate::config::LoopParams;
use crate::ports::action_runner::{ActionContext, ActionRunner};
use crate::ports::loop_progress::{LoopProgressNotifier, NoLoopProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use crate::use_cases::shared::is_cancelled;
use agentloop_domain::{
    ApprovalDecision, HilMode, NextStep, Plan, PlanStep, StepId, StepResult, ToolCallId,
};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute the first step whose dependencies are all complete.
    async fn execute_next(&self, plan: &Plan, ctx: ActionContext<'_>) -> NextStep;

    /// Execute every incomplete step in dependency order.
    async fn execute_batch(&self, plan: &Plan, ctx: ActionContext<'_>) -> Vec<StepResult>;
}

/// Executor over an [`ActionRunner`] and a per-run [`ApprovalGate`].
pub struct PlanExecutor {
    runner: Arc<dyn ActionRunner>,
    gate: Arc<ApprovalGate>,
    params: LoopParams,
    progress: Arc<dyn LoopProgressNotifier>,
    logger: Arc<dyn RunLogger>,
    cancellation: Option<CancellationToken>,
}

impl PlanExecutor {
    pub fn new(runner: Arc<dyn ActionRunner>, gate: Arc<ApprovalGate>, params: LoopParams) -> Self {
        Self {
            runner,
            gate,
            params,
            progress: Arc::new(NoLoopProgress),
            logger: Arc::new(NoRunLogger),
            cancellation: None,
        }
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

    fn needs_approval(&self, plan: &Plan, step: &PlanStep) -> bool {
        plan.strategy.requires_approval
            || step.action.requires_approval
            || self.runner.requires_approval(&step.action)
    }

    /// Obtain an approval decision for `step` according to the HiL mode.
    async fn approve(&self, step: &PlanStep) -> ApprovalDecision {
        match self.params.hil_mode {
            HilMode::AutoApprove => {
                warn!(
                    "Auto-approving step {} ({}) due to HilMode::AutoApprove",
                    step.id, step.action.name
                );
                ApprovalDecision::Approved
            }
            HilMode::AutoDeny => {
                info!(
                    "Auto-denying step {} ({}) due to HilMode::AutoDeny",
                    step.id, step.action.name
                );
                ApprovalDecision::Denied
            }
            HilMode::Interactive => {
                let id = ToolCallId::new(format!("{}-{}", step.id, uuid::Uuid::new_v4().simple()));
                let approval = self
                    .gate
                    .register(id, step.action.name.clone(), step.action.input.clone());
                self.progress.on_approval_required(&approval);
                self.logger.log(RunEvent::new(
                    "approval_requested",
                    serde_json::json!({
                        "tool_call_id": approval.tool_call_id,
                        "step_id": step.id,
                        "tool_name": approval.tool_name,
                        "input": approval.input,
                    }),
                ));

                let decision = match self
                    .gate
                    .await_decision(&approval.tool_call_id, self.params.approval_timeout)
                    .await
                {
                    Ok(decision) => decision,
                    Err(e) => {
                        warn!("Approval for step {} failed: {}", step.id, e);
                        ApprovalDecision::Denied
                    }
                };

                self.logger.log(RunEvent::new(
                    "approval_resolved",
                    serde_json::json!({
                        "tool_call_id": approval.tool_call_id,
                        "step_id": step.id,
                        "decision": decision,
                    }),
                ));
                decision
            }
        }
    }

    async fn run_step(&self, plan: &Plan, step: &PlanStep, ctx: ActionContext<'_>) -> StepResult {
        let result = self.attempt_step(plan, step, ctx).await;

        if result.success {
            info!("Step {} succeeded", step.id);
        } else {
            warn!(
                "Step {} {}: {}",
                step.id,
                result.disposition,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        self.progress.on_step_complete(&result);
        self.logger.log(RunEvent::new(
            "step_result",
            serde_json::to_value(&result).unwrap_or(serde_json::Value::Null),
        ));
        result
    }

    async fn attempt_step(&self, plan: &Plan, step: &PlanStep, ctx: ActionContext<'_>) -> StepResult {
        let started_at = Utc::now();

        if is_cancelled(&self.cancellation) {
            return StepResult::skipped(step.id.clone(), "Operation cancelled");
        }

        self.progress.on_step_start(step);
        debug!("Starting step {} ({})", step.id, step.action.name);

        if self.needs_approval(plan, step) && !self.approve(step).await.is_approved() {
            return StepResult::denied(step.id.clone(), "approval denied", started_at);
        }

        let output = match self.runner.run(step, ctx).await {
            Ok(output) => output,
            Err(e) => return StepResult::failure(step.id.clone(), e.to_string(), started_at),
        };

        if plan.strategy.requires_verification
            && let Err(reason) = self.runner.verify(step, &output).await
        {
            let result = StepResult::failure(
                step.id.clone(),
                format!("verification failed: {}", reason),
                started_at,
            );
            return match output.observation {
                Some(obs) => result.with_observation(obs),
                None => result,
            };
        }

        StepResult::success(step.id.clone(), output.output, output.observation, started_at)
    }
}

#[async_trait]
impl Executor for PlanExecutor {
    async fn execute_next(&self, plan: &Plan, ctx: ActionContext<'_>) -> NextStep {
        match plan.next_executable() {
            Some(step) => NextStep::Executed(self.run_step(plan, step, ctx).await),
            None => {
                debug!("No executable step in plan");
                NextStep::NoExecutableStep
            }
        }
    }

    async fn execute_batch(&self, plan: &Plan, ctx: ActionContext<'_>) -> Vec<StepResult> {
        if let Err(e) = plan.validate() {
            warn!("Refusing to execute invalid plan: {}", e);
            return plan
                .pending_steps()
                .map(|s| StepResult::failure(s.id.clone(), format!("Invalid plan: {}", e), Utc::now()))
                .collect();
        }

        // Steps already complete count as settled and successful
        let mut succeeded: HashSet<StepId> = plan
            .steps
            .iter()
            .filter(|s| s.is_complete)
            .map(|s| s.id.clone())
            .collect();
        let mut settled = succeeded.clone();
        let mut waiting: Vec<&PlanStep> = plan.pending_steps().collect();
        let mut results: HashMap<StepId, StepResult> = HashMap::new();
        let mut in_flight: FuturesUnordered<BoxFuture<'_, StepResult>> = FuturesUnordered::new();
        let max_concurrency = self.params.max_concurrency.max(1);

        loop {
            // Start (or skip) every step whose own dependencies have settled
            let mut index = 0;
            while index < waiting.len() {
                let step = waiting[index];
                if !step.depends_on.iter().all(|d| settled.contains(d)) {
                    index += 1;
                    continue;
                }
                if let Some(dep) = step.depends_on.iter().find(|d| !succeeded.contains(*d)) {
                    info!("Skipping step {}: dependency {} did not succeed", step.id, dep);
                    let skipped = StepResult::skipped(
                        step.id.clone(),
                        format!("dependency {} did not succeed", dep),
                    );
                    self.progress.on_step_complete(&skipped);
                    waiting.remove(index);
                    settled.insert(step.id.clone());
                    results.insert(step.id.clone(), skipped);
                    // A skip can settle steps earlier in the list
                    index = 0;
                    continue;
                }
                if in_flight.len() >= max_concurrency {
                    index += 1;
                    continue;
                }
                debug!("Scheduling step {} ({} in flight)", step.id, in_flight.len());
                waiting.remove(index);
                in_flight.push(self.run_step(plan, step, ctx).boxed());
            }

            let Some(result) = in_flight.next().await else {
                break;
            };
            if result.success {
                succeeded.insert(result.step_id.clone());
            }
            settled.insert(result.step_id.clone());
            results.insert(result.step_id.clone(), result);
        }

        plan.steps
            .iter()
            .filter_map(|s| results.remove(&s.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::action_runner::{ActionError, ActionOutput};
    use crate::ports::approval_notifier::{ChannelApprovalNotifier, NoApprovalNotifier};
    use agentloop_domain::{ReasoningStrategy, StepAction, StepDisposition};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records the order and (tokio) start time of actions, plus the peak
    /// number running at once. Fails actions named "fail".
    #[derive(Default)]
    struct RecordingRunner {
        ran: Mutex<Vec<(String, tokio::time::Instant)>>,
        risky: Vec<String>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl RecordingRunner {
        fn risky(names: &[&str]) -> Self {
            Self {
                risky: names.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        fn ran(&self) -> Vec<String> {
            self.ran.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
        }

        fn started_at(&self, id: &str) -> Option<tokio::time::Instant> {
            self.ran
                .lock()
                .unwrap()
                .iter()
                .find(|(ran, _)| ran == id)
                .map(|(_, at)| *at)
        }
    }

    #[async_trait]
    impl ActionRunner for RecordingRunner {
        async fn run(&self, step: &PlanStep, _ctx: ActionContext<'_>) -> Result<ActionOutput, ActionError> {
            self.ran
                .lock()
                .unwrap()
                .push((step.id.to_string(), tokio::time::Instant::now()));
            let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            if step.action.name == "fail" {
                return Err(ActionError::Failed("boom".to_string()));
            }
            Ok(ActionOutput::new(serde_json::json!(format!("did {}", step.id))))
        }

        fn requires_approval(&self, action: &StepAction) -> bool {
            self.risky.contains(&action.name)
        }

        async fn verify(&self, _step: &PlanStep, output: &ActionOutput) -> Result<(), String> {
            if output.output == serde_json::json!("did unverifiable") {
                return Err("output does not match".to_string());
            }
            Ok(())
        }
    }

    fn ctx() -> ActionContext<'static> {
        ActionContext {
            goal: "goal",
            observations: &[],
        }
    }

    fn step(id: &str, action: &str) -> PlanStep {
        PlanStep::new(id, id, StepAction::new(action))
    }

    fn executor(runner: Arc<RecordingRunner>, params: LoopParams) -> PlanExecutor {
        let gate = Arc::new(ApprovalGate::new(Arc::new(NoApprovalNotifier), CancellationToken::new()));
        PlanExecutor::new(runner, gate, params)
    }

    #[tokio::test]
    async fn test_execute_next_picks_first_eligible() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default());
        let plan = Plan::new(ReasoningStrategy::iterative())
            .with_step(step("b", "noop").with_dependency("a"))
            .with_step(step("a", "noop"));

        let NextStep::Executed(result) = executor.execute_next(&plan, ctx()).await else {
            panic!("expected a step to run");
        };
        assert_eq!(result.step_id.as_str(), "a");
        assert!(result.success);
        assert_eq!(runner.ran(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_execute_next_without_eligible_step() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner, LoopParams::default());
        let mut plan = Plan::new(ReasoningStrategy::iterative()).with_step(step("a", "noop"));
        plan.mark_step_complete(&StepId::new("a"));

        assert_eq!(executor.execute_next(&plan, ctx()).await, NextStep::NoExecutableStep);
    }

    #[tokio::test]
    async fn test_batch_respects_dependency_order() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default().with_max_concurrency(4));
        let plan = Plan::new(ReasoningStrategy::batch())
            .with_step(step("report", "noop").with_dependency("build").with_dependency("lint"))
            .with_step(step("build", "noop").with_dependency("fetch"))
            .with_step(step("fetch", "noop"))
            .with_step(step("lint", "noop"));

        let results = executor.execute_batch(&plan, ctx()).await;

        let ids: Vec<&str> = results.iter().map(|r| r.step_id.as_str()).collect();
        assert_eq!(ids, vec!["report", "build", "fetch", "lint"], "results in plan order");
        assert!(results.iter().all(|r| r.success));

        let by_id: HashMap<&str, &StepResult> =
            results.iter().map(|r| (r.step_id.as_str(), r)).collect();
        for s in &plan.steps {
            for dep in &s.depends_on {
                assert!(by_id[s.id.as_str()].started_at >= by_id[dep.as_str()].finished_at);
            }
        }

        let ran = runner.ran();
        let pos = |id: &str| ran.iter().position(|r| r == id).unwrap();
        assert!(pos("fetch") < pos("build"));
        assert!(pos("build") < pos("report"));
        assert!(pos("lint") < pos("report"));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_skips_dependents() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default());
        let plan = Plan::new(ReasoningStrategy::batch())
            .with_step(step("a", "fail"))
            .with_step(step("b", "noop"))
            .with_step(step("c", "noop").with_dependency("a"))
            .with_step(step("d", "noop").with_dependency("c"));

        let results = executor.execute_batch(&plan, ctx()).await;

        assert_eq!(results[0].disposition, StepDisposition::Failed);
        assert_eq!(results[0].error.as_deref(), Some("Action failed: boom"));
        assert!(results[1].success, "sibling still runs");
        assert_eq!(results[2].disposition, StepDisposition::Skipped);
        assert_eq!(results[3].disposition, StepDisposition::Skipped);
        assert!(!runner.ran().contains(&"c".to_string()));
    }

    #[tokio::test]
    async fn test_denied_step_halts_dependents() {
        let runner = Arc::new(RecordingRunner::risky(&["deploy"]));
        let executor = executor(
            runner.clone(),
            LoopParams::default().with_hil_mode(HilMode::AutoDeny),
        );
        let plan = Plan::new(ReasoningStrategy::batch())
            .with_step(step("A", "deploy"))
            .with_step(step("B", "notify").with_dependency("A"))
            .with_step(step("C", "noop"));

        let results = executor.execute_batch(&plan, ctx()).await;

        assert_eq!(results[0].disposition, StepDisposition::Denied);
        assert!(!results[0].success);
        assert_eq!(results[1].disposition, StepDisposition::Skipped);
        assert!(results[2].success);
        assert_eq!(runner.ran(), vec!["C"]);
    }

    #[tokio::test]
    async fn test_flagged_action_goes_through_gate() {
        let (notifier, mut rx) = ChannelApprovalNotifier::new();
        let gate = Arc::new(ApprovalGate::new(Arc::new(notifier), CancellationToken::new()));
        let runner = Arc::new(RecordingRunner::default());
        let executor = PlanExecutor::new(runner.clone(), gate.clone(), LoopParams::default());

        let responder = tokio::spawn(async move {
            let approval = rx.recv().await.unwrap();
            assert_eq!(approval.tool_name, "write");
            gate.resolve(&approval.tool_call_id, ApprovalDecision::Approved);
        });

        let plan = Plan::new(ReasoningStrategy::iterative())
            .with_step(PlanStep::new("w", "write", StepAction::new("write").with_approval()));
        let NextStep::Executed(result) = executor.execute_next(&plan, ctx()).await else {
            panic!("expected a step to run");
        };
        responder.await.unwrap();

        assert!(result.success);
        assert_eq!(runner.ran(), vec!["w"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_approval_times_out_as_denied() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(
            runner.clone(),
            LoopParams::default().with_approval_timeout(Some(Duration::from_millis(100))),
        );
        let plan = Plan::new(ReasoningStrategy::iterative().with_approval())
            .with_step(step("x", "noop"));

        let NextStep::Executed(result) = executor.execute_next(&plan, ctx()).await else {
            panic!("expected a step to run");
        };
        assert_eq!(result.disposition, StepDisposition::Denied);
        assert!(runner.ran().is_empty());
    }

    #[tokio::test]
    async fn test_verification_failure_marks_step_failed() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default());
        let plan = Plan::new(ReasoningStrategy::batch()).with_step(step("unverifiable", "noop"));

        let results = executor.execute_batch(&plan, ctx()).await;
        assert_eq!(results[0].disposition, StepDisposition::Failed);
        assert!(results[0].error.as_deref().unwrap().starts_with("verification failed"));

        let plan = Plan::new(ReasoningStrategy::batch().without_verification())
            .with_step(step("unverifiable", "noop"));
        let results = executor.execute_batch(&plan, ctx()).await;
        assert!(results[0].success);
    }

    #[tokio::test]
    async fn test_completed_steps_are_not_rerun() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default());
        let mut plan = Plan::new(ReasoningStrategy::batch())
            .with_step(step("a", "noop"))
            .with_step(step("b", "noop").with_dependency("a"));
        plan.mark_step_complete(&StepId::new("a"));

        let results = executor.execute_batch(&plan, ctx()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(runner.ran(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_cancelled_executor_skips_steps() {
        let token = CancellationToken::new();
        token.cancel();
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default()).with_cancellation(token);
        let plan = Plan::new(ReasoningStrategy::batch()).with_step(step("a", "noop"));

        let results = executor.execute_batch(&plan, ctx()).await;
        assert_eq!(results[0].disposition, StepDisposition::Skipped);
        assert!(runner.ran().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_approval_does_not_hold_back_independent_steps() {
        let (notifier, _approvals) = ChannelApprovalNotifier::new();
        let gate = Arc::new(ApprovalGate::new(Arc::new(notifier), CancellationToken::new()));
        let runner = Arc::new(RecordingRunner::risky(&["deploy"]));
        let executor = PlanExecutor::new(
            runner.clone(),
            gate,
            LoopParams::default().with_approval_timeout(Some(Duration::from_secs(300))),
        );
        let plan = Plan::new(ReasoningStrategy::batch())
            .with_step(step("A", "deploy"))
            .with_step(step("B", "noop"))
            .with_step(step("C", "noop").with_dependency("B"));

        let start = tokio::time::Instant::now();
        let results = executor.execute_batch(&plan, ctx()).await;

        assert_eq!(results[0].disposition, StepDisposition::Denied, "nobody answered");
        assert!(results[1].success);
        assert!(results[2].success);
        let c_started = runner.started_at("C").unwrap() - start;
        assert!(
            c_started < Duration::from_secs(1),
            "C waited {:?} on an unrelated approval",
            c_started
        );
        assert!(start.elapsed() >= Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_batch_honours_concurrency_limit() {
        let runner = Arc::new(RecordingRunner::default());
        let executor = executor(runner.clone(), LoopParams::default().with_max_concurrency(2));
        let mut plan = Plan::new(ReasoningStrategy::batch());
        for id in ["a", "b", "c", "d", "e"] {
            plan.add_step(step(id, "noop"));
        }

        let results = executor.execute_batch(&plan, ctx()).await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.success));
        assert!(runner.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_approval_ids_are_unique_per_request() {
        let (notifier, mut rx) = ChannelApprovalNotifier::new();
        let gate = Arc::new(ApprovalGate::new(Arc::new(notifier), CancellationToken::new()));
        let runner = Arc::new(RecordingRunner::risky(&["deploy"]));
        let executor = PlanExecutor::new(runner, gate.clone(), LoopParams::default());

        let responder = tokio::spawn(async move {
            let mut ids = Vec::new();
            for _ in 0..2 {
                let approval = rx.recv().await.unwrap();
                gate.resolve(&approval.tool_call_id, ApprovalDecision::Approved);
                ids.push(approval.tool_call_id.to_string());
            }
            ids
        });

        let plan = Plan::new(ReasoningStrategy::iterative()).with_step(step("ship", "deploy"));
        for _ in 0..2 {
            executor.execute_next(&plan, ctx()).await;
        }
        let ids = responder.await.unwrap();

        assert_ne!(ids[0], ids[1]);
        for id in &ids {
            let suffix = id.strip_prefix("ship-").unwrap();
            assert_eq!(suffix.len(), 32);
            assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
