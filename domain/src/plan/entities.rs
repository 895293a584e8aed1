//! Plan domain entities

use super::value_objects::{StepAction, StepId};
use crate::core::error::DomainError;
use crate::reasoning::ReasoningStrategy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single actionable unit of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: StepId,
    /// Human-readable description of what this step does
    pub description: String,
    pub action: StepAction,
    /// Steps that must complete before this one
    pub depends_on: Vec<StepId>,
    pub expected_outcome: String,
    pub is_complete: bool,
}

impl PlanStep {
    pub fn new(id: impl Into<StepId>, description: impl Into<String>, action: StepAction) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            action,
            depends_on: Vec::new(),
            expected_outcome: String::new(),
            is_complete: false,
        }
    }

    pub fn with_dependency(mut self, step_id: impl Into<StepId>) -> Self {
        self.depends_on.push(step_id.into());
        self
    }

    pub fn with_expected_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcome = outcome.into();
        self
    }

    /// Eligible when incomplete and every dependency is in `completed`.
    pub fn is_ready(&self, completed: &HashSet<&StepId>) -> bool {
        !self.is_complete && self.depends_on.iter().all(|dep| completed.contains(dep))
    }

    pub fn mark_complete(&mut self) {
        self.is_complete = true;
    }
}

/// A dependency-annotated decomposition of a goal.
///
/// Replaced wholesale on every planning phase; only step completion flags are
/// updated in place by the orchestration loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub strategy: ReasoningStrategy,
    pub is_complete: bool,
    /// Whether finishing every step of this plan finishes the goal.
    ///
    /// Batch plans always conclude the goal; iterative plans only when the
    /// planner says these are the final steps.
    pub concludes_goal: bool,
}

impl Plan {
    pub fn new(strategy: ReasoningStrategy) -> Self {
        Self {
            steps: Vec::new(),
            strategy,
            is_complete: false,
            concludes_goal: false,
        }
    }

    /// A zero-step plan signalling that the goal is already satisfied.
    pub fn completed(strategy: ReasoningStrategy) -> Self {
        Self {
            steps: Vec::new(),
            strategy,
            is_complete: true,
            concludes_goal: true,
        }
    }

    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn concluding(mut self) -> Self {
        self.concludes_goal = true;
        self
    }

    pub fn add_step(&mut self, step: PlanStep) {
        self.steps.push(step);
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, id: &StepId) -> Option<&PlanStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut PlanStep> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.step(id).is_some()
    }

    /// Mark a step complete. Returns `false` for unknown ids.
    pub fn mark_step_complete(&mut self, id: &StepId) -> bool {
        match self.step_mut(id) {
            Some(step) => {
                step.mark_complete();
                true
            }
            None => false,
        }
    }

    fn completed_ids(&self) -> HashSet<&StepId> {
        self.steps
            .iter()
            .filter(|s| s.is_complete)
            .map(|s| &s.id)
            .collect()
    }

    /// First incomplete step whose dependencies are all complete.
    pub fn next_executable(&self) -> Option<&PlanStep> {
        let completed = self.completed_ids();
        self.steps.iter().find(|s| s.is_ready(&completed))
    }

    pub fn pending_steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|s| !s.is_complete)
    }

    pub fn all_steps_complete(&self) -> bool {
        self.steps.iter().all(|s| s.is_complete)
    }

    /// Get completion progress (completed / total)
    pub fn progress(&self) -> (usize, usize) {
        let completed = self.steps.iter().filter(|s| s.is_complete).count();
        (completed, self.steps.len())
    }

    /// Flip `is_complete` once a goal-concluding plan has run every step.
    pub fn refresh_completion(&mut self) {
        if self.concludes_goal && self.all_steps_complete() {
            self.is_complete = true;
        }
    }

    /// Drop dependencies on steps completed by earlier plans.
    ///
    /// Iterative plans may reference steps from previous iterations; those
    /// dependencies are already satisfied and would otherwise dangle.
    pub fn strip_satisfied_dependencies(&mut self, satisfied: &HashSet<StepId>) {
        let own_ids: HashSet<StepId> = self.steps.iter().map(|s| s.id.clone()).collect();
        for step in &mut self.steps {
            step.depends_on
                .retain(|dep| own_ids.contains(dep) || !satisfied.contains(dep));
        }
    }

    /// Check structural invariants: non-empty unique ids, no dangling
    /// dependencies, no cycles.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.as_str().trim().is_empty() {
                return Err(DomainError::EmptyStepId);
            }
            if !seen.insert(&step.id) {
                return Err(DomainError::DuplicateStepId(step.id.to_string()));
            }
        }
        for step in &self.steps {
            if let Some(dep) = step.depends_on.iter().find(|d| !seen.contains(d)) {
                return Err(DomainError::DanglingDependency {
                    step: step.id.to_string(),
                    dependency: dep.to_string(),
                });
            }
        }
        self.execution_waves().map(|_| ())
    }

    /// Topological layering of the plan (Kahn's algorithm).
    ///
    /// Every step in wave `n` depends only on steps in waves `< n`. Within a
    /// wave, steps keep their plan order.
    pub fn execution_waves(&self) -> Result<Vec<Vec<StepId>>, DomainError> {
        let mut remaining: HashMap<&StepId, usize> = self
            .steps
            .iter()
            .map(|s| {
                let unique: HashSet<&StepId> = s.depends_on.iter().collect();
                (&s.id, unique.len())
            })
            .collect();

        let mut waves = Vec::new();
        let mut placed: HashSet<&StepId> = HashSet::new();

        while placed.len() < self.steps.len() {
            let wave: Vec<&StepId> = self
                .steps
                .iter()
                .filter(|s| !placed.contains(&s.id) && remaining.get(&s.id) == Some(&0))
                .map(|s| &s.id)
                .collect();

            if wave.is_empty() {
                let stuck: Vec<String> = self
                    .steps
                    .iter()
                    .filter(|s| !placed.contains(&s.id))
                    .map(|s| s.id.to_string())
                    .collect();
                return Err(DomainError::DependencyCycle(stuck.join(", ")));
            }

            for id in &wave {
                placed.insert(id);
            }
            for step in &self.steps {
                if placed.contains(&step.id) {
                    continue;
                }
                let unique: HashSet<&StepId> = step.depends_on.iter().collect();
                let unresolved = unique.iter().filter(|d| !placed.contains(**d)).count();
                remaining.insert(&step.id, unresolved);
            }

            waves.push(wave.into_iter().cloned().collect());
        }

        Ok(waves)
    }
}
