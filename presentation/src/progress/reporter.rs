//! Progress reporting for orchestration runs

use agentloop_application::LoopProgressNotifier;
use agentloop_domain::{
    ExecutionStyle, LoopPhase, LoopState, Plan, PlanStep, StepDisposition, StepResult,
    ToolApproval,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn disposition_mark(result: &StepResult) -> colored::ColoredString {
    match result.disposition {
        StepDisposition::Completed => "v".green(),
        StepDisposition::Failed => "x".red(),
        StepDisposition::Denied => "!".yellow(),
        StepDisposition::Skipped => "-".dimmed(),
    }
}

fn step_detail(result: &StepResult) -> String {
    result
        .error
        .clone()
        .or_else(|| result.observation.clone())
        .unwrap_or_default()
}

/// Reports progress with a spinner that tracks the current phase
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn lock(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Print a line above the spinner (or plainly if none is active).
    fn println(&self, line: String) {
        match self.lock().as_ref() {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn set_message(&self, prefix: String, message: String) {
        let mut spinner = self.lock();
        let pb = spinner.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        pb.set_prefix(prefix);
        pb.set_message(message);
    }

    fn finish(&self) {
        if let Some(pb) = self.lock().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopProgressNotifier for ProgressReporter {
    fn on_phase_change(&self, phase: LoopPhase, iteration: usize) {
        match phase {
            LoopPhase::Completed => self.finish(),
            LoopPhase::Running => {}
            _ => self.set_message(
                format!("Iteration {}", iteration + 1),
                format!("{}...", phase.display_name()),
            ),
        }
    }

    fn on_style_resolved(&self, style: ExecutionStyle) {
        self.println(format!("{} Execution style: {}", "->".cyan(), style.to_string().bold()));
    }

    fn on_plan_created(&self, plan: &Plan) {
        if plan.steps.is_empty() {
            self.println(format!("  {} Goal reported complete", "v".green()));
            return;
        }
        self.println(format!("  {} Plan with {} step(s)", "->".cyan(), plan.steps.len()));
        for step in &plan.steps {
            self.println(format!("    {} {}", format!("[{}]", step.id).dimmed(), step.description));
        }
    }

    fn on_planning_error(&self, error: &str) {
        self.println(format!("  {} Planning failed: {}", "x".red(), error));
    }

    fn on_step_start(&self, step: &PlanStep) {
        if let Some(pb) = self.lock().as_ref() {
            pb.set_message(format!("{} ({})", step.description, step.action.name));
        }
    }

    fn on_step_complete(&self, result: &StepResult) {
        self.println(format!(
            "  {} [{}] {}",
            disposition_mark(result),
            result.step_id,
            step_detail(result)
        ));
    }

    fn on_approval_required(&self, _approval: &ToolApproval) {
        // The prompt needs the terminal line
        self.finish();
    }

    fn on_iteration_complete(&self, state: &LoopState) {
        if state.is_complete {
            self.println(format!("{} Goal complete after {} iteration(s)", "v".green().bold(), state.iteration));
        }
    }
}

/// Simple text-based progress (no spinner)
pub struct SimpleProgress;

impl LoopProgressNotifier for SimpleProgress {
    fn on_phase_change(&self, phase: LoopPhase, iteration: usize) {
        if matches!(phase, LoopPhase::Planning) {
            eprintln!("{} {}", "->".cyan(), format!("Iteration {}", iteration + 1).bold());
        }
    }

    fn on_style_resolved(&self, style: ExecutionStyle) {
        eprintln!("Execution style: {}", style);
    }

    fn on_plan_created(&self, plan: &Plan) {
        eprintln!("  planned {} step(s)", plan.steps.len());
    }

    fn on_planning_error(&self, error: &str) {
        eprintln!("  {} planning failed: {}", "x".red(), error);
    }

    fn on_step_complete(&self, result: &StepResult) {
        eprintln!(
            "  {} [{}] {}",
            disposition_mark(result),
            result.step_id,
            step_detail(result)
        );
    }

    fn on_iteration_complete(&self, _state: &LoopState) {
        eprintln!();
    }
}
