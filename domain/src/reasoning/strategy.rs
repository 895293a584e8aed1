//! Reasoning strategy: the policy governing how planning and execution interleave.
//!
//! Defines [`ReasoningMode`] and the [`ReasoningStrategy`] configuration object:
//! - Iterative: plan the next step, execute it, observe, repeat (ReAct)
//! - Batch: plan every step upfront, execute the whole plan (ReWOO)
//! - Adaptive: pick one of the above per goal with a deterministic heuristic

use super::complexity::{ComplexityAssessment, ExecutionStyle};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default iteration budget for a run.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Reasoning mode, the user-facing execution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningMode {
    /// Plan one step at a time with an observation between steps
    Iterative,
    /// Plan everything upfront and execute as one batch
    Batch,
    /// Choose iterative or batch per goal
    #[default]
    Adaptive,
}

impl ReasoningMode {
    /// Get a short description for display
    pub fn short_description(&self) -> &'static str {
        match self {
            ReasoningMode::Iterative => "Iterative (plan → execute → observe per step)",
            ReasoningMode::Batch => "Batch (plan all upfront, execute together)",
            ReasoningMode::Adaptive => "Adaptive (chosen per goal)",
        }
    }
}

impl fmt::Display for ReasoningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningMode::Iterative => write!(f, "iterative"),
            ReasoningMode::Batch => write!(f, "batch"),
            ReasoningMode::Adaptive => write!(f, "adaptive"),
        }
    }
}

impl std::str::FromStr for ReasoningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "iterative" | "react" | "i" => Ok(ReasoningMode::Iterative),
            "batch" | "rewoo" | "b" => Ok(ReasoningMode::Batch),
            "adaptive" | "auto" | "a" => Ok(ReasoningMode::Adaptive),
            _ => Err(format!("Invalid ReasoningMode: {}", s)),
        }
    }
}

/// Configuration for one orchestration run.
///
/// Immutable for the duration of an iteration. Mode invariants:
/// - `Iterative` implies `observe_after_each_step`
/// - `Batch` implies `plan_all_upfront` and `execute_as_batch`
///
/// Every constructor and [`merge`](Self::merge) re-applies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStrategy {
    pub mode: ReasoningMode,
    pub max_iterations: usize,
    pub observe_after_each_step: bool,
    pub plan_all_upfront: bool,
    pub execute_as_batch: bool,
    pub requires_approval: bool,
    pub requires_verification: bool,
}

impl Default for ReasoningStrategy {
    fn default() -> Self {
        Self {
            mode: ReasoningMode::Adaptive,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            observe_after_each_step: true,
            plan_all_upfront: false,
            execute_as_batch: false,
            requires_approval: false,
            requires_verification: true,
        }
    }
}

impl ReasoningStrategy {
    /// Create a strategy for the given mode with default settings.
    pub fn new(mode: ReasoningMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
        .normalized()
    }

    /// Iterative (ReAct-style) strategy.
    pub fn iterative() -> Self {
        Self::new(ReasoningMode::Iterative)
    }

    /// Batch (ReWOO-style) strategy.
    pub fn batch() -> Self {
        Self::new(ReasoningMode::Batch)
    }

    /// Adaptive strategy.
    pub fn adaptive() -> Self {
        Self::new(ReasoningMode::Adaptive)
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    pub fn without_verification(mut self) -> Self {
        self.requires_verification = false;
        self
    }

    pub fn is_iterative(&self) -> bool {
        self.mode == ReasoningMode::Iterative
    }

    pub fn is_batch(&self) -> bool {
        self.mode == ReasoningMode::Batch
    }

    pub fn is_adaptive(&self) -> bool {
        self.mode == ReasoningMode::Adaptive
    }

    /// Whether the whole plan has to be produced before execution starts.
    pub fn requires_planning(&self) -> bool {
        self.is_batch() || self.plan_all_upfront
    }

    /// Overlay a partial override onto this strategy without mutating it.
    pub fn merge(&self, overrides: &StrategyOverride) -> ReasoningStrategy {
        ReasoningStrategy {
            mode: overrides.mode.unwrap_or(self.mode),
            max_iterations: overrides.max_iterations.unwrap_or(self.max_iterations),
            observe_after_each_step: overrides
                .observe_after_each_step
                .unwrap_or(self.observe_after_each_step),
            plan_all_upfront: overrides.plan_all_upfront.unwrap_or(self.plan_all_upfront),
            execute_as_batch: overrides.execute_as_batch.unwrap_or(self.execute_as_batch),
            requires_approval: overrides.requires_approval.unwrap_or(self.requires_approval),
            requires_verification: overrides
                .requires_verification
                .unwrap_or(self.requires_verification),
        }
        .normalized()
    }

    /// Check that the strategy can drive a run.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_iterations == 0 {
            return Err(DomainError::InvalidStrategy(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.is_iterative() && !self.observe_after_each_step {
            return Err(DomainError::InvalidStrategy(
                "iterative mode must observe after each step".to_string(),
            ));
        }
        if self.is_batch() && !(self.plan_all_upfront && self.execute_as_batch) {
            return Err(DomainError::InvalidStrategy(
                "batch mode must plan upfront and execute as batch".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the concrete execution style for a goal.
    ///
    /// Deterministic: identical goal text and strategy always yield the same style.
    pub fn resolve_style(&self, goal: &str) -> ExecutionStyle {
        match self.mode {
            ReasoningMode::Iterative => ExecutionStyle::Iterative,
            ReasoningMode::Batch => ExecutionStyle::Batch,
            ReasoningMode::Adaptive => {
                if self.plan_all_upfront && self.execute_as_batch {
                    ExecutionStyle::Batch
                } else {
                    ComplexityAssessment::of(goal).preferred_style()
                }
            }
        }
    }

    fn normalized(mut self) -> Self {
        match self.mode {
            ReasoningMode::Iterative => self.observe_after_each_step = true,
            ReasoningMode::Batch => {
                self.plan_all_upfront = true;
                self.execute_as_batch = true;
            }
            ReasoningMode::Adaptive => {}
        }
        self
    }
}

/// Partial strategy used to override a base strategy per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOverride {
    pub mode: Option<ReasoningMode>,
    pub max_iterations: Option<usize>,
    pub observe_after_each_step: Option<bool>,
    pub plan_all_upfront: Option<bool>,
    pub execute_as_batch: Option<bool>,
    pub requires_approval: Option<bool>,
    pub requires_verification: Option<bool>,
}

impl StrategyOverride {
    pub fn mode(mut self, mode: ReasoningMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn requires_approval(mut self, value: bool) -> Self {
        self.requires_approval = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == StrategyOverride::default()
    }
}
