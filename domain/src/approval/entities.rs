//! Tool-call approval entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tool call awaiting (or past) approval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallId(String);

impl ToolCallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ToolCallId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decision delivered to a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Denied,
}

impl ApprovalDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalDecision::Approved)
    }
}

impl fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalDecision::Approved => write!(f, "approved"),
            ApprovalDecision::Denied => write!(f, "denied"),
        }
    }
}

/// Lifecycle of an approval: `unknown -> pending -> approved | denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
    /// The id was never registered
    Unknown,
}

impl ApprovalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Denied)
    }

    pub fn decision(&self) -> Option<ApprovalDecision> {
        match self {
            ApprovalStatus::Approved => Some(ApprovalDecision::Approved),
            ApprovalStatus::Denied => Some(ApprovalDecision::Denied),
            _ => None,
        }
    }
}

impl From<ApprovalDecision> for ApprovalStatus {
    fn from(decision: ApprovalDecision) -> Self {
        match decision {
            ApprovalDecision::Approved => ApprovalStatus::Approved,
            ApprovalDecision::Denied => ApprovalStatus::Denied,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Denied => write!(f, "denied"),
            ApprovalStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A registered request to run a sensitive action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolApproval {
    pub tool_call_id: ToolCallId,
    pub tool_name: String,
    pub input: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub status: ApprovalStatus,
}

impl ToolApproval {
    pub fn pending(
        tool_call_id: ToolCallId,
        tool_name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self {
            tool_call_id,
            tool_name: tool_name.into(),
            input,
            timestamp: Utc::now(),
            status: ApprovalStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// Human-in-the-loop mode: where approval decisions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HilMode {
    /// Wait for an external decision through the approval gate
    #[default]
    Interactive,
    /// Approve every gated action without asking
    AutoApprove,
    /// Deny every gated action without asking
    AutoDeny,
}

impl HilMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HilMode::Interactive => "interactive",
            HilMode::AutoApprove => "auto_approve",
            HilMode::AutoDeny => "auto_deny",
        }
    }
}

impl fmt::Display for HilMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HilMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "interactive" => Ok(HilMode::Interactive),
            "auto_approve" | "approve" => Ok(HilMode::AutoApprove),
            "auto_deny" | "auto_reject" | "deny" => Ok(HilMode::AutoDeny),
            _ => Err(format!("Invalid HilMode: {}", s)),
        }
    }
}
