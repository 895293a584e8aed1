//! Action runners.
//!
//! Concrete [`ActionRunner`](agentloop_application::ActionRunner) adapters
//! and the [`ActionRegistry`] that routes steps between them.

mod command;
mod memory;
mod registry;

pub use command::{CommandActionRunner, CommandRunnerConfig, RUN_COMMAND};
pub use memory::{
    MEMORY_ACTIONS, MEMORY_RECALL, MEMORY_RECALL_BY_TAGS, MEMORY_REMEMBER, MemoryActionRunner,
};
pub use registry::ActionRegistry;
