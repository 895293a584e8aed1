//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! implement.

pub mod action_runner;
pub mod approval_notifier;
pub mod loop_progress;
pub mod memory_store;
pub mod model_gateway;
pub mod run_logger;
