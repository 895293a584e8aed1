//! Port for the structured run log.
//!
//! Separate from `tracing`: tracing carries human-readable diagnostics, the
//! run log captures a machine-readable record of a run (JSONL).

use serde_json::Value;

/// A structured run event: type string plus event-specific JSON payload.
pub struct RunEvent {
    /// Event type identifier (e.g. "plan_created", "step_result").
    pub event_type: &'static str,
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Synchronous and infallible: a broken log must not break the run.
pub trait RunLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when the run log is disabled.
pub struct NoRunLogger;

impl RunLogger for NoRunLogger {
    fn log(&self, _event: RunEvent) {}
}
