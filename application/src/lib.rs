//! Application layer for agentloop
//!
//! This crate contains use cases, port definitions, the approval gate, and
//! application configuration. It depends only on the domain layer.

pub mod approval;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use approval::{ApprovalError, ApprovalGate};
pub use config::LoopParams;
pub use ports::{
    action_runner::{ActionContext, ActionError, ActionOutput, ActionRunner},
    approval_notifier::{ApprovalNotifier, ChannelApprovalNotifier, NoApprovalNotifier},
    loop_progress::{LoopProgressNotifier, NoLoopProgress},
    memory_store::{MemoryError, MemoryStore},
    model_gateway::{GatewayError, ModelGateway, PromptContext, PromptPurpose},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::executor::{Executor, PlanExecutor};
pub use use_cases::model_action::ModelActionRunner;
pub use use_cases::planner::{ModelPlanner, Planner, PlanningError};
pub use use_cases::run_loop::{
    IterationCallback, RunLoopError, RunLoopInput, RunLoopUseCase, StopPredicate,
};
