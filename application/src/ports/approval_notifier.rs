//! Approval notification port.
//!
//! Push side of the approval channel: the gate announces every newly
//! registered approval so an approving party (console prompt, UI) can
//! surface it and eventually call `ApprovalGate::resolve`.

use agentloop_domain::{ApprovalStatus, ToolApproval, ToolCallId};
use tokio::sync::mpsc;

pub trait ApprovalNotifier: Send + Sync {
    /// Called once when an approval becomes pending
    fn on_approval_requested(&self, approval: &ToolApproval);

    /// Called when an approval reaches a terminal status
    fn on_approval_resolved(&self, _id: &ToolCallId, _status: ApprovalStatus) {}
}

/// Forwards pending approvals over an unbounded channel to a responder task.
pub struct ChannelApprovalNotifier {
    tx: mpsc::UnboundedSender<ToolApproval>,
}

impl ChannelApprovalNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ToolApproval>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ApprovalNotifier for ChannelApprovalNotifier {
    fn on_approval_requested(&self, approval: &ToolApproval) {
        // Responder gone: the waiter times out or is cancelled instead
        let _ = self.tx.send(approval.clone());
    }
}

/// No-op notifier for tests and auto-decided runs.
pub struct NoApprovalNotifier;

impl ApprovalNotifier for NoApprovalNotifier {
    fn on_approval_requested(&self, _approval: &ToolApproval) {}
}
