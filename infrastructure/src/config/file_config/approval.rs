//! Approval configuration from TOML (`[approval]` section)

use agentloop_domain::{ConfigIssue, HilMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw approval configuration from TOML
///
/// # Example
///
/// ```toml
/// [approval]
/// hil_mode = "interactive"     # "interactive", "auto_approve", "auto_deny"
/// timeout_ms = 300000          # 0 waits until answered or cancelled
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApprovalConfig {
    pub hil_mode: String,
    pub timeout_ms: u64,
}

impl Default for FileApprovalConfig {
    fn default() -> Self {
        Self {
            hil_mode: "interactive".to_string(),
            timeout_ms: 300_000,
        }
    }
}

impl FileApprovalConfig {
    pub fn parse_hil_mode(&self) -> (HilMode, Vec<ConfigIssue>) {
        match self.hil_mode.parse::<HilMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                HilMode::default(),
                vec![ConfigIssue::invalid_enum(
                    "approval.hil_mode",
                    &self.hil_mode,
                    &["interactive", "auto_approve", "auto_deny"],
                    "interactive",
                )],
            ),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
