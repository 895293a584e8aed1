//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod executor;
pub mod model_action;
pub mod planner;
pub mod run_loop;
pub(crate) mod shared;
