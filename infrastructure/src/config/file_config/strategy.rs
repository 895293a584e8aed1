//! Reasoning strategy configuration from TOML (`[strategy]` section)

use agentloop_domain::{ConfigIssue, ReasoningMode, ReasoningStrategy, StrategyOverride};
use serde::{Deserialize, Serialize};

/// Raw strategy configuration from TOML
///
/// # Example
///
/// ```toml
/// [strategy]
/// mode = "adaptive"            # "iterative", "batch", "adaptive"
/// max_iterations = 5
/// requires_approval = false
/// requires_verification = true
/// ```
///
/// Unset flags keep the mode's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStrategyConfig {
    pub mode: String,
    pub max_iterations: usize,
    pub observe_after_each_step: Option<bool>,
    pub plan_all_upfront: Option<bool>,
    pub execute_as_batch: Option<bool>,
    pub requires_approval: Option<bool>,
    pub requires_verification: Option<bool>,
}

impl Default for FileStrategyConfig {
    fn default() -> Self {
        Self {
            mode: "adaptive".to_string(),
            max_iterations: agentloop_domain::DEFAULT_MAX_ITERATIONS,
            observe_after_each_step: None,
            plan_all_upfront: None,
            execute_as_batch: None,
            requires_approval: None,
            requires_verification: None,
        }
    }
}

impl FileStrategyConfig {
    pub fn parse_mode(&self) -> (ReasoningMode, Vec<ConfigIssue>) {
        match self.mode.parse::<ReasoningMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                ReasoningMode::default(),
                vec![ConfigIssue::invalid_enum(
                    "strategy.mode",
                    &self.mode,
                    &["iterative", "batch", "adaptive"],
                    "adaptive",
                )],
            ),
        }
    }

    /// Build the base strategy for a run.
    pub fn to_strategy(&self) -> (ReasoningStrategy, Vec<ConfigIssue>) {
        let (mode, mut issues) = self.parse_mode();
        if self.max_iterations == 0 {
            issues.push(ConfigIssue::invalid_value(
                "strategy.max_iterations",
                "must be at least 1",
            ));
        }

        let overrides = StrategyOverride {
            mode: None,
            max_iterations: Some(self.max_iterations),
            observe_after_each_step: self.observe_after_each_step,
            plan_all_upfront: self.plan_all_upfront,
            execute_as_batch: self.execute_as_batch,
            requires_approval: self.requires_approval,
            requires_verification: self.requires_verification,
        };
        (ReasoningStrategy::new(mode).merge(&overrides), issues)
    }
}
