//! Tool-call approval: identifiers, statuses and human-in-the-loop modes.

pub mod entities;

pub use entities::{ApprovalDecision, ApprovalStatus, HilMode, ToolApproval, ToolCallId};
