//! Domain layer for agentloop
//!
//! Entities and value objects of the plan / execute / observe cycle. No I/O,
//! no async: everything here is pure and deterministic apart from id and
//! timestamp generation.
//!
//! # Core Concepts
//!
//! - **Reasoning strategy**: iterative (observe between steps), batch (plan
//!   everything upfront) or adaptive (chosen per goal by a heuristic)
//! - **Plan**: a dependency-annotated list of steps
//! - **Tool approval**: the lifecycle of a gated action awaiting a human
//! - **Memory**: keyed, tagged, optionally expiring facts
//! - **Loop state**: what one run has planned, done and observed

pub mod approval;
pub mod core;
pub mod execution;
pub mod memory;
pub mod orchestration;
pub mod plan;
pub mod prompt;
pub mod reasoning;

// Re-export commonly used types
pub use approval::{ApprovalDecision, ApprovalStatus, HilMode, ToolApproval, ToolCallId};
pub use core::config_issue::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::DomainError;
pub use execution::{NextStep, StepDisposition, StepOutcome, StepResult};
pub use memory::{Memory, MemoryId, MemoryMetadata, MemoryQuery, SetOptions};
pub use orchestration::{LoopPhase, LoopState};
pub use plan::{Plan, PlanStep, StepAction, StepId, parse_plan, parse_plan_json};
pub use prompt::{ExecutionPromptTemplate, PlanningPromptTemplate};
pub use reasoning::{
    ComplexityAssessment, DEFAULT_MAX_ITERATIONS, ExecutionStyle, ReasoningMode,
    ReasoningStrategy, StrategyOverride,
};
