//! Terminal approval prompt.
//!
//! Drains approvals announced by
//! [`ChannelApprovalNotifier`](agentloop_application::ChannelApprovalNotifier)
//! and asks on the terminal, one at a time:
//!
//! ```text
//! ── Approval required ──────────────────────────
//!   Step:   build-2f9c1a0e
//!   Action: run_command
//!   Input:  {"command":"cargo build"}
//! Approve? [y/N]
//! ```
//!
//! Anything other than `y`/`yes`/`approve` denies. When stdin closes every
//! remaining request is denied without prompting.

use agentloop_application::ApprovalGate;
use agentloop_domain::{ApprovalDecision, ToolApproval};
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Interpret one line of user input.
pub fn parse_answer(line: &str) -> ApprovalDecision {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" | "approve" | "a" | "/approve" => ApprovalDecision::Approved,
        _ => ApprovalDecision::Denied,
    }
}

pub struct ConsoleApprovalPrompt {
    gate: Arc<ApprovalGate>,
}

impl ConsoleApprovalPrompt {
    pub fn new(gate: Arc<ApprovalGate>) -> Self {
        Self { gate }
    }

    /// Serve approvals from stdin on a background task until the channel
    /// closes or `cancel` fires.
    pub fn spawn(
        self,
        approvals: UnboundedReceiver<ToolApproval>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            self.serve(approvals, stdin, cancel).await;
        })
    }

    /// Answer each approval with the next line from `input`.
    pub async fn serve<R>(
        &self,
        mut approvals: UnboundedReceiver<ToolApproval>,
        input: R,
        cancel: CancellationToken,
    ) where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut input_closed = false;

        loop {
            let approval = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = approvals.recv() => match next {
                    Some(approval) => approval,
                    None => break,
                },
            };

            let id = approval.tool_call_id.clone();
            if self.gate.status(&id).is_terminal() {
                debug!("Approval {} already decided, not prompting", id);
                continue;
            }

            let decision = if input_closed {
                ApprovalDecision::Denied
            } else {
                Self::display(&approval);
                let line = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    line = lines.next_line() => line,
                };
                match line {
                    Ok(Some(line)) => parse_answer(&line),
                    Ok(None) | Err(_) => {
                        input_closed = true;
                        ApprovalDecision::Denied
                    }
                }
            };

            let status = self.gate.resolve(&id, decision);
            eprintln!("  {} {}", "->".cyan(), status);
        }
    }

    fn display(approval: &ToolApproval) {
        eprintln!();
        eprintln!("{}", "── Approval required ──────────────────────────".yellow().bold());
        eprintln!("  {}   {}", "Step:".bold(), approval.tool_call_id);
        eprintln!("  {} {}", "Action:".bold(), approval.tool_name);
        if !approval.input.is_null() {
            eprintln!("  {}  {}", "Input:".bold(), approval.input);
        }
        eprint!("{} ", "Approve? [y/N]".yellow());
    }
}
