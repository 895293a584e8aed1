//! Approval gate for human-in-the-loop decisions.

pub mod gate;

pub use gate::{ApprovalError, ApprovalGate};
