//! Approval gate - suspend/resume rendezvous for gated actions.
//!
//! Per tool call id: `unknown -> pending -> approved | denied`. Terminal
//! states are sticky. Each registered entry owns a oneshot channel created at
//! registration, so a `resolve` that lands before anyone awaits is buffered
//! in the channel and in the entry status (no missed wakeup).
//!
//! One gate is constructed per run with that run's cancellation token;
//! cancelling the run force-denies every in-flight wait.

use crate::ports::approval_notifier::ApprovalNotifier;
use agentloop_domain::{ApprovalDecision, ApprovalStatus, ToolApproval, ToolCallId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("Unknown tool call: {0}")]
    Unknown(ToolCallId),

    #[error("Tool call {0} already has a waiter")]
    AlreadyAwaiting(ToolCallId),
}

struct Entry {
    approval: ToolApproval,
    tx: Option<oneshot::Sender<ApprovalDecision>>,
    rx: Option<oneshot::Receiver<ApprovalDecision>>,
}

pub struct ApprovalGate {
    entries: Mutex<HashMap<ToolCallId, Entry>>,
    notifier: Arc<dyn ApprovalNotifier>,
    cancellation: CancellationToken,
}

impl ApprovalGate {
    pub fn new(notifier: Arc<dyn ApprovalNotifier>, cancellation: CancellationToken) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            notifier,
            cancellation,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ToolCallId, Entry>> {
        // No code path panics while holding the lock; recover the map if one ever does
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a pending approval.
    ///
    /// Idempotent: an id that is already registered (pending or terminal) is
    /// left untouched and its current record returned.
    pub fn register(
        &self,
        id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        input: serde_json::Value,
    ) -> ToolApproval {
        let id = id.into();
        let approval = {
            let mut entries = self.lock();
            if let Some(existing) = entries.get(&id) {
                debug!("Approval {} already registered ({})", id, existing.approval.status);
                return existing.approval.clone();
            }
            let approval = ToolApproval::pending(id.clone(), tool_name, input);
            let (tx, rx) = oneshot::channel();
            entries.insert(
                id,
                Entry {
                    approval: approval.clone(),
                    tx: Some(tx),
                    rx: Some(rx),
                },
            );
            approval
        };

        info!(
            "Approval requested for {} ({})",
            approval.tool_call_id, approval.tool_name
        );
        self.notifier.on_approval_requested(&approval);
        approval
    }

    /// Deliver a decision. Returns the resulting status.
    ///
    /// Unknown ids yield [`ApprovalStatus::Unknown`]; terminal ids keep (and
    /// return) their existing status.
    pub fn resolve(&self, id: &ToolCallId, decision: ApprovalDecision) -> ApprovalStatus {
        let status = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(id) else {
                warn!("Ignoring decision for unknown tool call {}", id);
                return ApprovalStatus::Unknown;
            };
            if entry.approval.status.is_terminal() {
                debug!("Approval {} already {}", id, entry.approval.status);
                return entry.approval.status;
            }
            entry.approval.status = decision.into();
            if let Some(tx) = entry.tx.take() {
                // Waiter may have timed out already; the status above is what counts
                let _ = tx.send(decision);
            }
            entry.approval.status
        };

        info!("Approval {} resolved: {}", id, status);
        self.notifier.on_approval_resolved(id, status);
        status
    }

    /// Suspend until `id` leaves pending, `timeout` elapses, or the run is
    /// cancelled. Timeout and cancellation force the entry to denied.
    pub async fn await_decision(
        &self,
        id: &ToolCallId,
        timeout: Option<Duration>,
    ) -> Result<ApprovalDecision, ApprovalError> {
        let rx = {
            let mut entries = self.lock();
            let entry = entries
                .get_mut(id)
                .ok_or_else(|| ApprovalError::Unknown(id.clone()))?;
            if let Some(decision) = entry.approval.status.decision() {
                return Ok(decision);
            }
            entry
                .rx
                .take()
                .ok_or_else(|| ApprovalError::AlreadyAwaiting(id.clone()))?
        };

        let mut wait = PendingWait {
            gate: self,
            id,
            settled: false,
        };
        let received = tokio::select! {
            biased;

            _ = self.cancellation.cancelled() => {
                info!("Run cancelled while awaiting approval {}", id);
                None
            }
            result = rx => result.ok(),
            _ = sleep_for(timeout) => {
                info!("Approval {} timed out after {:?}", id, timeout.unwrap_or_default());
                None
            }
        };
        wait.settled = true;

        if let Some(decision) = received {
            return Ok(decision);
        }
        Ok(self.force_deny(id))
    }

    /// Register, notify, then await (the common path for a gated step).
    pub async fn request(
        &self,
        id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        input: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<ApprovalDecision, ApprovalError> {
        let approval = self.register(id, tool_name, input);
        self.await_decision(&approval.tool_call_id, timeout).await
    }

    /// Deny a still-pending entry. A decision that raced in first wins.
    fn force_deny(&self, id: &ToolCallId) -> ApprovalDecision {
        {
            let mut entries = self.lock();
            match entries.get_mut(id) {
                Some(entry) if entry.approval.is_pending() => {
                    entry.approval.status = ApprovalStatus::Denied;
                    entry.tx = None;
                }
                Some(entry) => {
                    return entry
                        .approval
                        .status
                        .decision()
                        .unwrap_or(ApprovalDecision::Denied);
                }
                // Cleared while waiting
                None => return ApprovalDecision::Denied,
            }
        }
        self.notifier.on_approval_resolved(id, ApprovalStatus::Denied);
        ApprovalDecision::Denied
    }

    /// Snapshot of pending approvals, oldest first.
    pub fn list_pending(&self) -> Vec<ToolApproval> {
        let mut pending: Vec<ToolApproval> = self
            .lock()
            .values()
            .filter(|e| e.approval.is_pending())
            .map(|e| e.approval.clone())
            .collect();
        pending.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.tool_call_id.as_str().cmp(b.tool_call_id.as_str()))
        });
        pending
    }

    pub fn status(&self, id: &ToolCallId) -> ApprovalStatus {
        self.lock()
            .get(id)
            .map(|e| e.approval.status)
            .unwrap_or(ApprovalStatus::Unknown)
    }

    pub fn get(&self, id: &ToolCallId) -> Option<ToolApproval> {
        self.lock().get(id).map(|e| e.approval.clone())
    }

    /// Drop every entry. In-flight waiters resolve to denied.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        count
    }
}

/// Denies the entry if an in-progress wait is dropped before it settles.
/// The receiver is gone with the wait, so the entry could never be decided.
struct PendingWait<'a> {
    gate: &'a ApprovalGate,
    id: &'a ToolCallId,
    settled: bool,
}

impl Drop for PendingWait<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Wait for approval {} was dropped, denying it", self.id);
            self.gate.force_deny(self.id);
        }
    }
}

async fn sleep_for(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::approval_notifier::{ChannelApprovalNotifier, NoApprovalNotifier};
    use tokio::time::Instant;

    fn gate() -> ApprovalGate {
        ApprovalGate::new(Arc::new(NoApprovalNotifier), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_resolve_before_await_is_not_missed() {
        let gate = gate();
        let id = ToolCallId::new("call-1");
        gate.register(id.clone(), "write_file", serde_json::json!({}));

        assert_eq!(gate.resolve(&id, ApprovalDecision::Approved), ApprovalStatus::Approved);
        let decision = gate.await_decision(&id, None).await.unwrap();
        assert_eq!(decision, ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn test_resolve_releases_waiter() {
        let gate = Arc::new(gate());
        let id = ToolCallId::new("call-2");
        gate.register(id.clone(), "deploy", serde_json::Value::Null);

        let waiter = {
            let gate = gate.clone();
            let id = id.clone();
            tokio::spawn(async move { gate.await_decision(&id, None).await })
        };
        tokio::task::yield_now().await;

        gate.resolve(&id, ApprovalDecision::Denied);
        assert_eq!(waiter.await.unwrap().unwrap(), ApprovalDecision::Denied);
        assert_eq!(gate.status(&id), ApprovalStatus::Denied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_forces_denied() {
        let gate = gate();
        let id = ToolCallId::new("call-3");
        gate.register(id.clone(), "rm", serde_json::Value::Null);

        let start = Instant::now();
        let decision = gate
            .await_decision(&id, Some(Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(decision, ApprovalDecision::Denied);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));
        assert!(gate.list_pending().is_empty());
        assert_eq!(gate.status(&id), ApprovalStatus::Denied);
    }

    #[tokio::test]
    async fn test_terminal_states_are_sticky() {
        let gate = gate();
        let id = ToolCallId::new("call-4");
        gate.register(id.clone(), "x", serde_json::Value::Null);
        gate.resolve(&id, ApprovalDecision::Denied);

        assert_eq!(gate.resolve(&id, ApprovalDecision::Approved), ApprovalStatus::Denied);
        let again = gate.register(id.clone(), "x", serde_json::Value::Null);
        assert_eq!(again.status, ApprovalStatus::Denied);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let gate = gate();
        let id = ToolCallId::new("never");
        assert_eq!(gate.status(&id), ApprovalStatus::Unknown);
        assert_eq!(gate.resolve(&id, ApprovalDecision::Approved), ApprovalStatus::Unknown);
        assert_eq!(
            gate.await_decision(&id, None).await,
            Err(ApprovalError::Unknown(id.clone()))
        );
        assert!(gate.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_register_is_idempotent_while_pending() {
        let gate = gate();
        let first = gate.register("dup", "a", serde_json::json!(1));
        let second = gate.register("dup", "b", serde_json::json!(2));
        assert_eq!(first, second);
        assert_eq!(gate.list_pending().len(), 1);
    }

    #[tokio::test]
    async fn test_second_waiter_is_rejected() {
        let gate = Arc::new(gate());
        let id = ToolCallId::new("call-5");
        gate.register(id.clone(), "x", serde_json::Value::Null);

        let first = {
            let gate = gate.clone();
            let id = id.clone();
            tokio::spawn(async move { gate.await_decision(&id, None).await })
        };
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            gate.await_decision(&id, None).await,
            Err(ApprovalError::AlreadyAwaiting(id.clone()))
        );
        gate.resolve(&id, ApprovalDecision::Approved);
        assert_eq!(first.await.unwrap().unwrap(), ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn test_cancellation_denies_in_flight_wait() {
        let token = CancellationToken::new();
        let gate = Arc::new(ApprovalGate::new(Arc::new(NoApprovalNotifier), token.clone()));
        let id = ToolCallId::new("call-6");
        gate.register(id.clone(), "x", serde_json::Value::Null);

        let waiter = {
            let gate = gate.clone();
            let id = id.clone();
            tokio::spawn(async move { gate.await_decision(&id, None).await })
        };
        tokio::task::yield_now().await;
        token.cancel();

        assert_eq!(waiter.await.unwrap().unwrap(), ApprovalDecision::Denied);
        assert_eq!(gate.status(&id), ApprovalStatus::Denied);
    }

    #[tokio::test]
    async fn test_clear_releases_waiters_as_denied() {
        let gate = Arc::new(gate());
        let id = ToolCallId::new("call-7");
        gate.register(id.clone(), "x", serde_json::Value::Null);

        let waiter = {
            let gate = gate.clone();
            let id = id.clone();
            tokio::spawn(async move { gate.await_decision(&id, None).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(gate.clear(), 1);
        assert_eq!(waiter.await.unwrap().unwrap(), ApprovalDecision::Denied);
        assert_eq!(gate.status(&id), ApprovalStatus::Unknown);
    }

    #[tokio::test]
    async fn test_request_notifies_and_waits() {
        let (notifier, mut rx) = ChannelApprovalNotifier::new();
        let gate = Arc::new(ApprovalGate::new(Arc::new(notifier), CancellationToken::new()));

        let responder = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let approval = rx.recv().await.unwrap();
                assert_eq!(approval.tool_name, "send_email");
                gate.resolve(&approval.tool_call_id, ApprovalDecision::Approved)
            })
        };

        let decision = gate
            .request("call-8", "send_email", serde_json::json!({"to": "ops"}), None)
            .await
            .unwrap();
        assert_eq!(decision, ApprovalDecision::Approved);
        assert_eq!(responder.await.unwrap(), ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_pending_excludes_resolved() {
        let gate = gate();
        gate.register("a", "x", serde_json::Value::Null);
        gate.register("b", "x", serde_json::Value::Null);
        gate.resolve(&ToolCallId::new("a"), ApprovalDecision::Approved);

        let pending: Vec<String> = gate
            .list_pending()
            .into_iter()
            .map(|a| a.tool_call_id.to_string())
            .collect();
        assert_eq!(pending, vec!["b"]);
    }

    #[tokio::test]
    async fn test_abandoned_wait_denies_entry() {
        let gate = Arc::new(gate());
        let id = ToolCallId::new("call-9");
        gate.register(id.clone(), "deploy", serde_json::Value::Null);

        let waiter = {
            let gate = gate.clone();
            let id = id.clone();
            tokio::spawn(async move { gate.await_decision(&id, None).await })
        };
        tokio::task::yield_now().await;
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        assert!(gate.list_pending().is_empty());
        assert_eq!(gate.status(&id), ApprovalStatus::Denied);
        assert_eq!(
            gate.await_decision(&id, None).await,
            Ok(ApprovalDecision::Denied)
        );
    }
}
