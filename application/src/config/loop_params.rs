//! Loop parameters - orchestration loop control.
//!
//! [`LoopParams`] groups the static knobs of a run that are application
//! concerns rather than reasoning policy: how approvals are decided, how long
//! they may take, how wide batch waves fan out, and how hard the planner
//! retries.

use agentloop_domain::HilMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopParams {
    /// Where approval decisions come from.
    pub hil_mode: HilMode,
    /// Per-wait approval timeout; `None` waits until resolved or cancelled.
    pub approval_timeout: Option<Duration>,
    /// Maximum steps of one batch wave running at once.
    pub max_concurrency: usize,
    /// Model calls per planning phase before giving up on unparseable output.
    pub planning_attempts: usize,
    /// Write each iteration's observations to the memory store.
    pub record_observations: bool,
}

impl Default for LoopParams {
    fn default() -> Self {
        Self {
            hil_mode: HilMode::Interactive,
            approval_timeout: Some(Duration::from_secs(300)),
            max_concurrency: 4,
            planning_attempts: 2,
            record_observations: true,
        }
    }
}

impl LoopParams {
    // ==================== Builder Methods ====================

    pub fn with_hil_mode(mut self, mode: HilMode) -> Self {
        self.hil_mode = mode;
        self
    }

    pub fn with_approval_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.approval_timeout = timeout;
        self
    }

    /// Clamped to at least one.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Clamped to at least one.
    pub fn with_planning_attempts(mut self, attempts: usize) -> Self {
        self.planning_attempts = attempts.max(1);
        self
    }

    pub fn with_record_observations(mut self, record: bool) -> Self {
        self.record_observations = record;
        self
    }
}
