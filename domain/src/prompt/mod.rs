//! Prompt templates for the planner and the model-backed executor.

pub mod execution;
pub mod planning;

pub use execution::ExecutionPromptTemplate;
pub use planning::PlanningPromptTemplate;
